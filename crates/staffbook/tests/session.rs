//! End-to-end session tests driven by scripted console input.

use std::io::Cursor;

use staffbook::storage::sqlite::SqliteStore;
use staffbook::storage::UpdateCounts;
use staffbook::{
    Console, Credential, Employee, Error, Failure, Gateway, RecordId, RecordStore, Result,
    Session, State,
};

const LOGIN: &str = "1\nadmin@example.com\ns3cret\n";
const ALICE: &str = "Alice Smith\nEngineer\n75000\n30\n1234567890\n221B Baker Street\n";
const BOB: &str = "Bob Jones\nManager\n90000\n45\n9876543210\n12 Elm Road\n";

/// A store that cannot be reached, except optionally for logins.
#[derive(Debug)]
struct OutageStore {
    accepts_logins: bool,
}

impl OutageStore {
    fn down<T>() -> Result<T> {
        Err(Error::connection("server selection timed out"))
    }
}

impl RecordStore for OutageStore {
    fn name(&self) -> &'static str {
        "outage"
    }
    fn ping(&self) -> Result<()> {
        Self::down()
    }
    fn find_credential(&self, email: &str) -> Result<Option<Credential>> {
        if self.accepts_logins {
            Ok(Some(Credential::new(email, "s3cret")))
        } else {
            Self::down()
        }
    }
    fn put_credential(&self, _credential: &Credential) -> Result<()> {
        Self::down()
    }
    fn list(&self) -> Result<Vec<Employee>> {
        Self::down()
    }
    fn insert(&self, _employee: &Employee) -> Result<RecordId> {
        Self::down()
    }
    fn get(&self, _id: &RecordId) -> Result<Option<Employee>> {
        Self::down()
    }
    fn update(&self, _id: &RecordId, _employee: &Employee) -> Result<UpdateCounts> {
        Self::down()
    }
    fn delete(&self, _id: &RecordId) -> Result<u64> {
        Self::down()
    }
    fn search(&self, _term: &str) -> Result<Vec<Employee>> {
        Self::down()
    }
}

type ScriptedSession = Session<Cursor<Vec<u8>>, Vec<u8>>;

fn gateway() -> Gateway {
    let gateway = Gateway::new(Box::new(
        SqliteStore::open_in_memory().expect("failed to create test store"),
    ));
    gateway
        .register_user("admin@example.com", "s3cret")
        .expect("failed to register test user");
    gateway
}

fn alice() -> Employee {
    Employee::new(
        "Alice Smith",
        "Engineer",
        75_000.0,
        30,
        1_234_567_890,
        "221B Baker Street",
    )
}

fn bob() -> Employee {
    Employee::new("Bob Jones", "Manager", 90_000.0, 45, 9_876_543_210, "12 Elm Road")
}

fn session(gateway: Gateway, script: &str) -> ScriptedSession {
    Session::new(
        gateway,
        Console::new(Cursor::new(script.as_bytes().to_vec()), Vec::new()),
    )
}

/// Run the script to completion and return the store and console output.
fn run(gateway: Gateway, script: &str) -> (Gateway, String) {
    let mut session = session(gateway, script);
    session.run().expect("script should end with Exit");
    assert_eq!(session.state(), State::Exit);

    let (gateway, console) = session.into_parts();
    (gateway, String::from_utf8(console.into_output()).unwrap())
}

#[test]
fn test_full_record_lifecycle() {
    let script = [
        LOGIN,
        // edit menu, add Alice then Bob
        "2\n1\n",
        ALICE,
        "\ny\n",
        BOB,
        "\nn\n",
        // back to main menu and view the list
        "4\n1\n",
        // modify #1: raise salary
        "2\n2\n1\n\n\n\n80000\n\n\n\nn\n",
        // delete #2
        "3\n2\n\nn\n",
        // main menu, search, logout, exit
        "4\n3\nengineer\nesc\n4\n2\n",
    ]
    .concat();

    let (gateway, out) = run(gateway(), &script);

    assert!(out.contains("Login successful!"));
    assert_eq!(out.matches("Employee added successfully!").count(), 2);
    assert!(out.contains("Employee updated successfully!"));
    assert!(out.contains("Employee deleted successfully!"));
    assert!(out.contains("Logged out."));

    let records = gateway.list_records().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "Alice Smith");
    assert_eq!(records[0].salary, 80_000.0);
}

#[test]
fn test_add_reprompts_invalid_fields() {
    let script = [
        LOGIN,
        "2\n1\n",
        "Alice1\nAlice Smith\nEngineer\n499\nlots\n75000\n17\n30\n12345\n1234567890\n   \n221B Baker Street\n",
        "\nn\n4\n4\n2\n",
    ]
    .concat();

    let (gateway, out) = run(gateway(), &script);

    assert!(out.contains("Name must contain only alphabetic characters."));
    assert_eq!(
        out.matches("Salary must be at least 500 and in a valid numeric format.")
            .count(),
        2
    );
    assert!(out.contains("Age must be a positive number between 18 and 99"));
    assert!(out.contains("Phone number must be a 10-digit number"));
    assert!(out.contains("Address cannot be empty."));

    let records = gateway.list_records().unwrap();
    assert_eq!(records.len(), 1);
    assert!(records[0].same_fields(&alice()));
}

#[test]
fn test_cancel_add_stores_nothing() {
    let script = [LOGIN, "2\n1\n", ALICE, "esc\nn\n4\n4\n2\n"].concat();

    let (gateway, out) = run(gateway(), &script);

    assert!(out.contains("Operation canceled."));
    assert!(gateway.list_records().unwrap().is_empty());
}

#[test]
fn test_modify_with_identical_values_reports_no_changes() {
    let gateway = gateway();
    gateway.insert_record(&alice()).unwrap();

    let script = [LOGIN, "2\n2\n1\n\n\n\n\n\n\n\nn\n4\n4\n2\n"].concat();
    let (_, out) = run(gateway, &script);

    assert!(out.contains("No changes found."));
    assert!(!out.contains("Employee updated successfully!"));
}

#[test]
fn test_cancel_modify_reenters_workflow() {
    let gateway = gateway();
    gateway.insert_record(&alice()).unwrap();

    // cancel at confirmation, then leave with a blank ordinal
    let script = [LOGIN, "2\n2\n1\nesc\n\n4\n4\n2\n"].concat();
    let (gateway, out) = run(gateway, &script);

    assert!(out.contains("Operation canceled."));
    assert_eq!(
        out.matches("Enter the ID of the employee to modify").count(),
        2
    );
    assert!(gateway.list_records().unwrap()[0].same_fields(&alice()));
}

#[test]
fn test_unknown_and_invalid_ordinals() {
    let gateway = gateway();
    gateway.insert_record(&alice()).unwrap();

    let script = [LOGIN, "2\n3\n7\nabc\n\n4\n4\n2\n"].concat();
    let (gateway, out) = run(gateway, &script);

    assert!(out.contains("Employee not found with ID: 7"));
    assert!(out.contains("Invalid ID! Please enter a number."));
    assert_eq!(gateway.list_records().unwrap().len(), 1);
}

#[test]
fn test_empty_list_messages() {
    let script = [LOGIN, "1\n2\n2\n3\n4\n4\n2\n"].concat();
    let (_, out) = run(gateway(), &script);

    assert!(out.contains("No employees found."));
    assert!(out.contains("No employees found to modify."));
    assert!(out.contains("No employees found to delete."));
}

#[test]
fn test_search_messages_and_results() {
    let gateway = gateway();
    gateway.insert_record(&alice()).unwrap();
    gateway.insert_record(&bob()).unwrap();

    let script = [LOGIN, "3\n\nnobody\n\nENGINEER\nesc\n4\n2\n"].concat();
    let (_, out) = run(gateway, &script);

    assert!(out.contains("Search term cannot be empty."));
    assert!(out.contains("No records found for nobody."));
    assert!(out.contains("Alice Smith"));
    assert!(!out.contains("Bob Jones"));
}

#[test]
fn test_delete_refreshes_ordinals() {
    let gateway = gateway();
    gateway.insert_record(&alice()).unwrap();
    gateway.insert_record(&bob()).unwrap();

    // delete #1, then delete the new #1 (formerly Bob)
    let script = [LOGIN, "2\n3\n1\n\ny\n1\n\nn\n"].concat();
    let mut session = session(gateway, &script);
    assert!(session.run().unwrap_err().is_input_closed());
    assert_eq!(session.state(), State::EditMenu);
    assert!(session.ordinals().is_empty());

    let (gateway, _) = session.into_parts();
    assert!(gateway.list_records().unwrap().is_empty());
}

#[test]
fn test_input_closed_mid_workflow() {
    let script = [LOGIN, "2\n1\nAlice Smith\n"].concat();
    let mut session = session(gateway(), &script);

    let err = session.run().unwrap_err();
    assert!(err.is_input_closed());

    let (gateway, _) = session.into_parts();
    assert!(gateway.list_records().unwrap().is_empty());
}

#[test]
fn test_login_during_outage() {
    let gateway = Gateway::new(Box::new(OutageStore {
        accepts_logins: false,
    }));
    let (_, out) = run(gateway, "1\nadmin@example.com\ns3cret\nesc\n2\n");

    assert!(out.contains(Failure::Connectivity.message()));
    assert!(!out.contains("Login successful!"));
}

#[test]
fn test_list_outage_keeps_session_running() {
    let gateway = Gateway::new(Box::new(OutageStore {
        accepts_logins: true,
    }));
    // view, modify, search, then logout and exit
    let script = [LOGIN, "1\n2\n2\n4\n3\nengineer\nesc\n4\n2\n"].concat();
    let (_, out) = run(gateway, &script);

    assert!(out.contains("Login successful!"));
    // one failed fetch per main menu entry (4) plus the modify workflow (1)
    assert_eq!(out.matches(Failure::Connectivity.message()).count(), 5);
    assert!(out.contains("No records found for engineer."));
    assert!(out.contains("Logged out."));
}

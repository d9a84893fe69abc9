//! Interactive session controller.
//!
//! A [`Session`] owns the gateway, the console and the ordinal map, and moves
//! between the menu [`State`]s until the operator exits. Workflows (add,
//! modify, delete, search) run to completion inside their menu state and
//! return to it. The ordinal map is refreshed on every list fetch and after
//! every insert or delete.

pub mod console;

use std::io::{BufRead, Write};

use tracing::{debug, info, warn};

pub use console::{Console, MessageLevel};

use crate::config::Config;
use crate::display;
use crate::employee::{Employee, RecordId};
use crate::error::Result;
use crate::gateway::{Gateway, Lookup, UpdateOutcome};
use crate::ordinal::OrdinalMap;
use crate::storage;
use crate::validate;

/// Where the session is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Waiting for a login.
    LoggedOut,
    /// The top-level menu after login.
    MainMenu,
    /// The add/modify/delete menu.
    EditMenu,
    /// The operator chose to exit.
    Exit,
}

const LOGIN_MENU: [&str; 2] = ["Login", "Exit"];
const MAIN_MENU: [&str; 4] = [
    "View Employees List",
    "Edit Employees List",
    "Search Record",
    "Logout",
];
const EDIT_MENU: [&str; 4] = ["Add", "Modify", "Delete", "Main Menu"];

const CANCELED: &str = "Operation canceled.";

/// Load configuration and open the store, letting the operator retry until
/// it works. `None` means the operator chose to exit.
///
/// `load` runs on every attempt so edits to the config file or environment
/// made while the prompt waits are picked up.
///
/// # Errors
///
/// Returns [`crate::Error::InputClosed`] if input ends at the retry prompt,
/// or an I/O error if the console fails.
pub fn connect<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    mut load: impl FnMut() -> Result<Config>,
) -> Result<Option<Gateway>> {
    loop {
        let attempt = load().and_then(|config| storage::open(&config.database));

        match attempt {
            Ok(store) => return Ok(Some(Gateway::new(store))),
            Err(err) => {
                warn!("Startup attempt failed: {}", err);
                console.message(
                    MessageLevel::Error,
                    &format!("Could not connect to the database: {err}"),
                )?;
                if !console.enter_or_escape("Press Enter to retry or type 'esc' to exit: ")? {
                    return Ok(None);
                }
            }
        }
    }
}

/// One operator session.
#[derive(Debug)]
pub struct Session<R, W> {
    gateway: Gateway,
    console: Console<R, W>,
    ordinals: OrdinalMap,
    state: State,
    user: Option<String>,
}

impl<R: BufRead, W: Write> Session<R, W> {
    /// Start a logged-out session.
    pub fn new(gateway: Gateway, console: Console<R, W>) -> Self {
        Self {
            gateway,
            console,
            ordinals: OrdinalMap::new(),
            state: State::LoggedOut,
            user: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Email of the logged-in operator.
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// The mapping from the most recent list fetch.
    pub fn ordinals(&self) -> &OrdinalMap {
        &self.ordinals
    }

    /// Take the session apart.
    pub fn into_parts(self) -> (Gateway, Console<R, W>) {
        (self.gateway, self.console)
    }

    /// Run until the operator exits.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InputClosed`] if input ends first, or an I/O
    /// error if the console fails.
    pub fn run(&mut self) -> Result<()> {
        loop {
            debug!("Session state {:?}", self.state);
            match self.state {
                State::LoggedOut => self.login_menu()?,
                State::MainMenu => self.main_menu()?,
                State::EditMenu => self.edit_menu()?,
                State::Exit => return Ok(()),
            }
        }
    }

    fn login_menu(&mut self) -> Result<()> {
        match self.console.menu("Login Menu", &LOGIN_MENU)? {
            1 => self.login(),
            _ => {
                self.console.message(MessageLevel::Info, "Goodbye!")?;
                self.state = State::Exit;
                Ok(())
            }
        }
    }

    fn login(&mut self) -> Result<()> {
        loop {
            let email = self.console.prompt("Email: ")?;
            let password = self.console.prompt("Password: ")?;

            match self.gateway.find_user_by_credential_key(&email) {
                Lookup::Found(credential) if credential.matches_password(&password) => {
                    self.console
                        .message(MessageLevel::Success, "Login successful!")?;
                    info!("Operator {} logged in", email);
                    self.user = Some(email);
                    self.state = State::MainMenu;
                    return Ok(());
                }
                Lookup::Found(_) => self
                    .console
                    .message(MessageLevel::Error, "Invalid password! Please try again.")?,
                Lookup::NotFound => self.console.message(
                    MessageLevel::Error,
                    "No user found with the provided email.",
                )?,
                Lookup::Failed(failure) => self
                    .console
                    .message(MessageLevel::Error, failure.message())?,
            }

            if !self
                .console
                .enter_or_escape("Press Enter to try again or type 'esc' to go back: ")?
            {
                return Ok(());
            }
        }
    }

    fn main_menu(&mut self) -> Result<()> {
        let records = self.refresh()?;
        match self.console.menu("Main Menu", &MAIN_MENU)? {
            1 => self.view_list(records),
            2 => {
                self.state = State::EditMenu;
                Ok(())
            }
            3 => self.search(),
            _ => {
                info!("Operator {} logged out", self.user.as_deref().unwrap_or("?"));
                self.user = None;
                self.ordinals.clear();
                self.console.message(MessageLevel::Info, "Logged out.")?;
                self.state = State::LoggedOut;
                Ok(())
            }
        }
    }

    fn edit_menu(&mut self) -> Result<()> {
        match self.console.menu("Edit Menu", &EDIT_MENU)? {
            1 => self.add(),
            2 => self.modify(),
            3 => self.delete(),
            _ => {
                self.state = State::MainMenu;
                Ok(())
            }
        }
    }

    /// Fetch the list and rebuild the ordinal map. `None` if the fetch failed.
    fn refresh(&mut self) -> Result<Option<Vec<Employee>>> {
        match self.gateway.list_records() {
            Ok(records) => {
                self.ordinals.rebuild(&records);
                Ok(Some(records))
            }
            Err(failure) => {
                self.ordinals.clear();
                self.console.message(MessageLevel::Error, failure.message())?;
                Ok(None)
            }
        }
    }

    /// Show the list fetched on entering the main menu.
    fn view_list(&mut self, records: Option<Vec<Employee>>) -> Result<()> {
        match records {
            Some(records) if records.is_empty() => self
                .console
                .message(MessageLevel::Warning, "No employees found."),
            Some(records) => self.console.show(&display::render_table(&records)),
            None => Ok(()),
        }
    }

    fn add(&mut self) -> Result<()> {
        loop {
            self.console.say("Enter employee details:")?;
            let employee = self.read_employee()?;

            if self.console.confirm("add this employee")? {
                match self.gateway.insert_record(&employee) {
                    Ok(_) => {
                        self.console
                            .message(MessageLevel::Success, "Employee added successfully!")?;
                        self.refresh()?;
                    }
                    Err(failure) => self.console.message(MessageLevel::Error, failure.message())?,
                }
            } else {
                self.console.message(MessageLevel::Warning, CANCELED)?;
            }

            if !self
                .console
                .ask_yes_no("Do you want to add more employees?")?
            {
                return Ok(());
            }
        }
    }

    fn modify(&mut self) -> Result<()> {
        loop {
            let Some((ordinal, id, current)) =
                self.choose_record("modify", "No employees found to modify.")?
            else {
                return Ok(());
            };

            if !self.console.confirm("modify this employee")? {
                self.console.message(MessageLevel::Warning, CANCELED)?;
                continue;
            }

            self.console
                .say("Leave a field blank to keep its current value.")?;
            let changed = self.read_changes(&current)?;
            match self.gateway.update_record(&id, &changed) {
                UpdateOutcome::Updated => self
                    .console
                    .message(MessageLevel::Success, "Employee updated successfully!")?,
                UpdateOutcome::Unchanged => self
                    .console
                    .message(MessageLevel::Info, "No changes found.")?,
                UpdateOutcome::Failed(failure) => {
                    debug!("Update of ordinal {} failed: {:?}", ordinal, failure);
                    self.console.message(MessageLevel::Error, failure.message())?;
                }
            }

            if !self
                .console
                .ask_yes_no("Do you want to modify another employee?")?
            {
                return Ok(());
            }
        }
    }

    fn delete(&mut self) -> Result<()> {
        loop {
            let Some((_, id, _)) = self.choose_record("delete", "No employees found to delete.")?
            else {
                return Ok(());
            };

            if !self.console.confirm("delete this employee")? {
                self.console.message(MessageLevel::Warning, CANCELED)?;
                continue;
            }

            if self.gateway.delete_record(&id) {
                self.console
                    .message(MessageLevel::Success, "Employee deleted successfully!")?;
                self.refresh()?;
            } else {
                self.console
                    .message(MessageLevel::Error, "Failed to delete employee.")?;
            }

            if !self
                .console
                .ask_yes_no("Do you want to delete another employee?")?
            {
                return Ok(());
            }
        }
    }

    /// Show the list, read an ordinal and show that record's card.
    ///
    /// `None` means go back to the edit menu: the list was empty or could not
    /// be fetched, or the operator entered a blank ordinal.
    fn choose_record(
        &mut self,
        verb: &str,
        empty_message: &str,
    ) -> Result<Option<(usize, RecordId, Employee)>> {
        let Some(records) = self.refresh()? else {
            return Ok(None);
        };
        if records.is_empty() {
            self.console.message(MessageLevel::Warning, empty_message)?;
            return Ok(None);
        }
        self.console.show(&display::render_table(&records))?;

        loop {
            let raw = self.console.prompt(&format!(
                "Enter the ID of the employee to {verb} (blank to go back): "
            ))?;
            if raw.is_empty() {
                return Ok(None);
            }
            let Ok(ordinal) = raw.parse::<usize>() else {
                self.console
                    .message(MessageLevel::Error, "Invalid ID! Please enter a number.")?;
                continue;
            };

            let not_found = format!("Employee not found with ID: {ordinal}");
            let Some(id) = self.ordinals.resolve(ordinal).cloned() else {
                self.console.message(MessageLevel::Error, &not_found)?;
                continue;
            };

            match self.gateway.get_record(&id) {
                Lookup::Found(employee) => {
                    self.console
                        .show(&display::render_card(ordinal, &employee))?;
                    return Ok(Some((ordinal, id, employee)));
                }
                Lookup::NotFound => self.console.message(MessageLevel::Error, &not_found)?,
                Lookup::Failed(failure) => {
                    self.console.message(MessageLevel::Error, failure.message())?;
                    return Ok(None);
                }
            }
        }
    }

    fn search(&mut self) -> Result<()> {
        loop {
            let term = self.console.prompt("Enter search term: ")?;
            if term.is_empty() {
                self.console
                    .message(MessageLevel::Error, "Search term cannot be empty.")?;
                continue;
            }

            let results = self.gateway.search_records(&term);
            if results.is_empty() {
                self.console.message(
                    MessageLevel::Warning,
                    &format!("No records found for {term}."),
                )?;
            } else {
                for (index, employee) in results.iter().enumerate() {
                    self.console
                        .show(&display::render_card(index + 1, employee))?;
                }
            }

            if !self.console.enter_or_escape(
                "Press Enter to search again or type 'esc' to return to the main menu: ",
            )? {
                return Ok(());
            }
        }
    }

    fn read_employee(&mut self) -> Result<Employee> {
        let c = &mut self.console;
        Ok(Employee::new(
            c.read_field("Name: ", validate::validate_name)?,
            c.read_field("Designation: ", validate::validate_designation)?,
            c.read_field("Salary: ", validate::validate_salary)?,
            c.read_field("Age: ", validate::validate_age)?,
            c.read_field("Phone: ", validate::validate_phone)?,
            c.read_field("Address: ", validate::validate_address)?,
        ))
    }

    fn read_changes(&mut self, current: &Employee) -> Result<Employee> {
        let c = &mut self.console;
        let name = c.read_optional_field(&format!("Name [{}]: ", current.name), validate::validate_name)?;
        let designation = c.read_optional_field(
            &format!("Designation [{}]: ", current.designation),
            validate::validate_designation,
        )?;
        let salary = c.read_optional_field(
            &format!("Salary [{:.2}]: ", current.salary),
            validate::validate_salary,
        )?;
        let age = c.read_optional_field(&format!("Age [{}]: ", current.age), validate::validate_age)?;
        let phone = c.read_optional_field(
            &format!("Phone [{:010}]: ", current.phone),
            validate::validate_phone,
        )?;
        let address = c.read_optional_field(
            &format!("Address [{}]: ", current.address),
            validate::validate_address,
        )?;

        Ok(Employee {
            id: current.id.clone(),
            name: name.unwrap_or_else(|| current.name.clone()),
            designation: designation.unwrap_or_else(|| current.designation.clone()),
            salary: salary.unwrap_or(current.salary),
            age: age.unwrap_or(current.age),
            phone: phone.unwrap_or(current.phone),
            address: address.unwrap_or_else(|| current.address.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::error::Error;
    use crate::storage::sqlite::SqliteStore;
    use std::io::Cursor;

    type TestSession = Session<Cursor<Vec<u8>>, Vec<u8>>;

    fn session(script: &str) -> TestSession {
        let gateway = Gateway::new(Box::new(
            SqliteStore::open_in_memory().expect("failed to create test store"),
        ));
        gateway.register_user("admin@example.com", "s3cret").unwrap();
        Session::new(
            gateway,
            Console::new(Cursor::new(script.as_bytes().to_vec()), Vec::new()),
        )
    }

    fn finish(session: TestSession) -> (Gateway, String) {
        let (gateway, console) = session.into_parts();
        (gateway, String::from_utf8(console.into_output()).unwrap())
    }

    #[test]
    fn test_exit_from_login_menu() {
        let mut s = session("2\n");
        s.run().unwrap();
        assert_eq!(s.state(), State::Exit);
    }

    #[test]
    fn test_wrong_password_then_back() {
        let mut s = session("1\nadmin@example.com\nnope\nesc\n2\n");
        s.run().unwrap();
        assert!(s.user().is_none());

        let (_, out) = finish(s);
        assert!(out.contains("Invalid password! Please try again."));
    }

    #[test]
    fn test_unknown_user() {
        let mut s = session("1\nghost@example.com\nx\nesc\n2\n");
        s.run().unwrap();
        let (_, out) = finish(s);
        assert!(out.contains("No user found with the provided email."));
    }

    #[test]
    fn test_login_then_input_closed() {
        let mut s = session("1\nadmin@example.com\ns3cret\n");
        let err = s.run().unwrap_err();
        assert!(err.is_input_closed());
        assert_eq!(s.state(), State::MainMenu);
        assert_eq!(s.user(), Some("admin@example.com"));
    }

    #[test]
    fn test_add_refreshes_ordinals() {
        let script = "1\nadmin@example.com\ns3cret\n2\n1\n\
                      Alice Smith\nEngineer\n75000\n30\n1234567890\n221B Baker Street\n\nn\n";
        let mut s = session(script);
        assert!(s.run().unwrap_err().is_input_closed());
        assert_eq!(s.state(), State::EditMenu);
        assert_eq!(s.ordinals().len(), 1);

        let (gateway, out) = finish(s);
        assert!(out.contains("Employee added successfully!"));
        assert_eq!(gateway.list_records().unwrap().len(), 1);
    }

    #[test]
    fn test_read_changes_keeps_blank_fields() {
        let mut s = session("\n\n80000\n\n\n\n");
        let current = Employee::new(
            "Alice Smith",
            "Engineer",
            75_000.0,
            30,
            1_234_567_890,
            "221B Baker Street",
        )
        .with_id(RecordId::new("1"));

        let changed = s.read_changes(&current).unwrap();
        assert_eq!(changed.salary, 80_000.0);
        assert_eq!(changed.name, current.name);
        assert_eq!(changed.id(), current.id());
    }

    fn scripted_console(script: &str) -> Console<Cursor<Vec<u8>>, Vec<u8>> {
        Console::new(Cursor::new(script.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_connect_escape_exits() {
        let mut console = scripted_console("esc\n");
        let gateway = connect(&mut console, || {
            Ok(Config {
                database: DatabaseConfig {
                    uri: Some("postgres://localhost/employees".to_string()),
                    ..DatabaseConfig::default()
                },
            })
        })
        .unwrap();
        assert!(gateway.is_none());

        let out = String::from_utf8(console.into_output()).unwrap();
        assert!(out.contains("Could not connect to the database: unsupported database uri"));
        assert!(out.contains("Press Enter to retry or type 'esc' to exit"));
    }

    #[test]
    fn test_connect_retries_until_store_opens() {
        let mut console = scripted_console("\n");
        let mut attempts = 0;
        let gateway = connect(&mut console, || {
            attempts += 1;
            if attempts == 1 {
                Err(Error::connection("server selection timed out"))
            } else {
                Ok(Config {
                    database: DatabaseConfig::in_memory(),
                })
            }
        })
        .unwrap();

        assert!(gateway.is_some());
        assert_eq!(attempts, 2);
        let out = String::from_utf8(console.into_output()).unwrap();
        assert_eq!(out.matches("server selection timed out").count(), 1);
    }

    #[test]
    fn test_connect_input_closed_at_retry_prompt() {
        let mut console = scripted_console("");
        let err = connect(&mut console, || Ok(Config::default())).unwrap_err();
        assert!(err.is_input_closed());
    }
}

//! BSON encoding for records and credentials.
//!
//! Decoding is field by field so a document written by another tool with a
//! missing field or an unexpected type is reported as
//! [`Error::MalformedRecord`] naming that field. Numeric fields accept any of
//! the BSON number types; integral fields reject fractional doubles.

use mongodb::bson::{doc, oid::ObjectId, Bson, Document};

use crate::employee::{Credential, Employee, RecordId};
use crate::error::{Error, Result};

const UNKNOWN_ID: &str = "<unknown>";

/// Encode the six data fields of a record. The identifier is never written.
///
/// # Errors
///
/// Returns an error if the phone number does not fit a BSON 64-bit integer.
pub fn encode_employee(employee: &Employee) -> Result<Document> {
    let phone = i64::try_from(employee.phone)
        .map_err(|_| Error::internal(format!("phone number out of range: {}", employee.phone)))?;

    Ok(doc! {
        "name": employee.name.as_str(),
        "designation": employee.designation.as_str(),
        "salary": employee.salary,
        "age": i32::from(employee.age),
        "phone": phone,
        "address": employee.address.as_str(),
    })
}

/// Decode a staff document into a record carrying its identifier.
///
/// # Errors
///
/// Returns [`Error::MalformedRecord`] if any field is missing or mistyped.
pub fn decode_employee(document: &Document) -> Result<Employee> {
    let id = match document.get("_id") {
        Some(Bson::ObjectId(oid)) => RecordId::new(oid.to_hex()),
        Some(Bson::String(s)) => RecordId::new(s.clone()),
        Some(other) => {
            return Err(Error::malformed(
                UNKNOWN_ID,
                "_id",
                format!("has unsupported type {:?}", other.element_type()),
            ))
        }
        None => return Err(Error::malformed(UNKNOWN_ID, "_id", "is missing")),
    };
    let key = id.as_str();

    let age = whole_number(document, key, "age")?;
    let age = u8::try_from(age)
        .map_err(|_| Error::malformed(key, "age", format!("is out of range: {age}")))?;
    let phone = whole_number(document, key, "phone")?;
    let phone = u64::try_from(phone)
        .map_err(|_| Error::malformed(key, "phone", format!("is negative: {phone}")))?;

    Ok(Employee::new(
        string(document, key, "name")?,
        string(document, key, "designation")?,
        number(document, key, "salary")?,
        age,
        phone,
        string(document, key, "address")?,
    )
    .with_id(id))
}

/// Encode a credential document.
#[must_use]
pub fn encode_credential(credential: &Credential) -> Document {
    doc! {
        "email": credential.email.as_str(),
        "password": credential.password.as_str(),
    }
}

/// Decode a credential document.
///
/// # Errors
///
/// Returns [`Error::MalformedRecord`] if the email or password is missing or
/// not a string.
pub fn decode_credential(document: &Document) -> Result<Credential> {
    let key = document.get_str("email").unwrap_or(UNKNOWN_ID);
    Ok(Credential::new(
        string(document, key, "email")?,
        string(document, key, "password")?,
    ))
}

/// Filter selecting the document with `id`.
///
/// Identifiers in ObjectId hex form match `ObjectId` keys; anything else is
/// matched as a string key.
#[must_use]
pub fn id_filter(id: &RecordId) -> Document {
    match ObjectId::parse_str(id.as_str()) {
        Ok(oid) => doc! { "_id": oid },
        Err(_) => doc! { "_id": id.as_str() },
    }
}

/// Filter for a case-insensitive literal substring match on name,
/// designation or address.
#[must_use]
pub fn search_filter(term: &str) -> Document {
    let pattern = regex::escape(term);
    doc! {
        "$or": [
            { "name": { "$regex": pattern.as_str(), "$options": "i" } },
            { "designation": { "$regex": pattern.as_str(), "$options": "i" } },
            { "address": { "$regex": pattern.as_str(), "$options": "i" } },
        ]
    }
}

/// Convert the identifier a store returned from an insert.
///
/// # Errors
///
/// Returns an internal error for identifier types this crate never writes.
pub fn record_id_from_bson(value: &Bson) -> Result<RecordId> {
    match value {
        Bson::ObjectId(oid) => Ok(RecordId::new(oid.to_hex())),
        Bson::String(s) => Ok(RecordId::new(s.clone())),
        other => Err(Error::internal(format!(
            "unexpected inserted id type {:?}",
            other.element_type()
        ))),
    }
}

fn string(document: &Document, id: &str, field: &'static str) -> Result<String> {
    match document.get(field) {
        Some(Bson::String(s)) => Ok(s.clone()),
        Some(other) => Err(Error::malformed(
            id,
            field,
            format!("is not a string ({:?})", other.element_type()),
        )),
        None => Err(Error::malformed(id, field, "is missing")),
    }
}

#[allow(clippy::cast_precision_loss)]
fn number(document: &Document, id: &str, field: &'static str) -> Result<f64> {
    match document.get(field) {
        Some(Bson::Double(v)) => Ok(*v),
        Some(Bson::Int32(v)) => Ok(f64::from(*v)),
        Some(Bson::Int64(v)) => Ok(*v as f64),
        Some(other) => Err(Error::malformed(
            id,
            field,
            format!("is not a number ({:?})", other.element_type()),
        )),
        None => Err(Error::malformed(id, field, "is missing")),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn whole_number(document: &Document, id: &str, field: &'static str) -> Result<i64> {
    match document.get(field) {
        Some(Bson::Int32(v)) => Ok(i64::from(*v)),
        Some(Bson::Int64(v)) => Ok(*v),
        Some(Bson::Double(v)) if v.is_finite() && v.fract() == 0.0 => Ok(*v as i64),
        Some(Bson::Double(v)) => Err(Error::malformed(
            id,
            field,
            format!("is not a whole number: {v}"),
        )),
        Some(other) => Err(Error::malformed(
            id,
            field,
            format!("is not a number ({:?})", other.element_type()),
        )),
        None => Err(Error::malformed(id, field, "is missing")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    fn stored_document() -> Document {
        let mut document = encode_employee(&alice()).unwrap();
        document.insert("_id", ObjectId::parse_str("65f0c0ffee65f0c0ffee65f0").unwrap());
        document
    }

    #[test]
    fn test_encode_field_types() {
        let document = encode_employee(&alice()).unwrap();
        assert!(document.get("_id").is_none());
        assert_eq!(document.get("salary"), Some(&Bson::Double(75_000.0)));
        assert_eq!(document.get("age"), Some(&Bson::Int32(30)));
        assert_eq!(document.get("phone"), Some(&Bson::Int64(1_234_567_890)));
        assert_eq!(document.get_str("address").unwrap(), "221B Baker Street");
    }

    #[test]
    fn test_decode_stored_document() {
        let employee = decode_employee(&stored_document()).unwrap();
        assert!(employee.same_fields(&alice()));
        assert_eq!(
            employee.id().map(RecordId::as_str),
            Some("65f0c0ffee65f0c0ffee65f0")
        );
    }

    #[test]
    fn test_decode_accepts_other_number_types() {
        let document = doc! {
            "_id": "legacy-1",
            "name": "Bob",
            "designation": "Manager",
            "salary": 900_i32,
            "age": 45.0,
            "phone": 9_876_543_210_i64,
            "address": "Elm Road",
        };
        let employee = decode_employee(&document).unwrap();
        assert_eq!(employee.salary, 900.0);
        assert_eq!(employee.age, 45);
        assert_eq!(employee.phone, 9_876_543_210);
        assert_eq!(employee.id().map(RecordId::as_str), Some("legacy-1"));
    }

    #[test]
    fn test_decode_missing_field() {
        let mut document = stored_document();
        document.remove("salary");

        let err = decode_employee(&document).unwrap_err();
        assert!(err.is_malformed_record());
        let msg = err.to_string();
        assert!(msg.contains("salary"));
        assert!(msg.contains("65f0c0ffee65f0c0ffee65f0"));
    }

    #[test]
    fn test_decode_wrong_type() {
        let mut document = stored_document();
        document.insert("name", 42_i32);

        let err = decode_employee(&document).unwrap_err();
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn test_decode_fractional_age() {
        let mut document = stored_document();
        document.insert("age", 30.5);

        let err = decode_employee(&document).unwrap_err();
        assert!(err.to_string().contains("whole number"));
    }

    #[test]
    fn test_decode_missing_id() {
        let document = encode_employee(&alice()).unwrap();
        let err = decode_employee(&document).unwrap_err();
        assert!(err.to_string().contains("_id"));
    }

    #[test]
    fn test_credential_documents() {
        let credential = Credential::new("admin@example.com", "s3cret");
        let document = encode_credential(&credential);
        assert_eq!(decode_credential(&document).unwrap(), credential);

        let err = decode_credential(&doc! { "email": "admin@example.com" }).unwrap_err();
        assert!(err.to_string().contains("password"));
    }

    #[test]
    fn test_id_filter() {
        let oid = "65f0c0ffee65f0c0ffee65f0";
        let filter = id_filter(&RecordId::new(oid));
        assert!(matches!(filter.get("_id"), Some(Bson::ObjectId(_))));

        let filter = id_filter(&RecordId::new("legacy-1"));
        assert_eq!(filter.get_str("_id").unwrap(), "legacy-1");
    }

    #[test]
    fn test_search_filter_escapes_term() {
        let filter = search_filter("a.b(");
        let clauses = filter.get_array("$or").unwrap();
        assert_eq!(clauses.len(), 3);

        let first = clauses[0].as_document().unwrap().get_document("name").unwrap();
        assert_eq!(first.get_str("$regex").unwrap(), r"a\.b\(");
        assert_eq!(first.get_str("$options").unwrap(), "i");
    }

    #[test]
    fn test_record_id_from_bson() {
        let oid = ObjectId::new();
        assert_eq!(
            record_id_from_bson(&Bson::ObjectId(oid)).unwrap().as_str(),
            oid.to_hex()
        );
        assert_eq!(
            record_id_from_bson(&Bson::String("x".into())).unwrap().as_str(),
            "x"
        );
        assert!(record_id_from_bson(&Bson::Int32(1)).is_err());
    }
}

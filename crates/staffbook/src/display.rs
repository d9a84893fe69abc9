//! Box-drawn renderings of employee records.
//!
//! Columns are sized by terminal display width, not byte length, so names
//! with accented or wide characters stay aligned.

use unicode_width::UnicodeWidthStr;

use crate::employee::Employee;

const TABLE_HEADERS: [&str; 7] = [
    "ID",
    "Name",
    "Designation",
    "Salary",
    "Age",
    "Phone",
    "Address",
];

const CARD_KEYS: [&str; 7] = TABLE_HEADERS;

/// Render records as a table numbered from 1 in slice order.
#[must_use]
pub fn render_table(records: &[Employee]) -> String {
    let rows: Vec<Vec<String>> = records
        .iter()
        .enumerate()
        .map(|(index, employee)| cells(index + 1, employee).to_vec())
        .collect();
    let header: Vec<String> = TABLE_HEADERS.iter().map(ToString::to_string).collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.width()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.width());
        }
    }

    let mut out = String::new();
    out.push_str(&rule('┌', '┬', '┐', &widths));
    out.push_str(&line(&header, &widths));
    out.push_str(&rule('├', '┼', '┤', &widths));
    for row in &rows {
        out.push_str(&line(row, &widths));
    }
    out.push_str(&rule('└', '┴', '┘', &widths));
    out
}

/// Render one record as a key/value card.
#[must_use]
pub fn render_card(ordinal: usize, employee: &Employee) -> String {
    let values = cells(ordinal, employee);
    let widths = [
        CARD_KEYS.iter().map(|k| k.width()).max().unwrap_or(0),
        values.iter().map(|v| v.width()).max().unwrap_or(0),
    ];

    let mut out = String::new();
    out.push_str(&rule('┌', '┬', '┐', &widths));
    for (key, value) in CARD_KEYS.iter().zip(values) {
        out.push_str(&line(&[(*key).to_string(), value], &widths));
    }
    out.push_str(&rule('└', '┴', '┘', &widths));
    out
}

fn cells(ordinal: usize, employee: &Employee) -> [String; 7] {
    [
        ordinal.to_string(),
        employee.name.clone(),
        employee.designation.clone(),
        format!("{:.2}", employee.salary),
        employee.age.to_string(),
        format!("{:010}", employee.phone),
        employee.address.clone(),
    ]
}

fn rule(left: char, join: char, right: char, widths: &[usize]) -> String {
    let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
    format!("{left}{}{right}\n", segments.join(&join.to_string()))
}

fn line(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let fill = width.saturating_sub(cell.width());
            format!(" {cell}{} ", " ".repeat(fill))
        })
        .collect();
    format!("│{}│\n", padded.join("│"))
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

    fn assert_aligned(rendered: &str) {
        let widths: Vec<usize> = rendered.lines().map(UnicodeWidthStr::width).collect();
        assert!(
            widths.windows(2).all(|pair| pair[0] == pair[1]),
            "ragged lines: {widths:?}\n{rendered}"
        );
    }

    #[test]
    fn test_table_contains_rows_in_order() {
        let bob = Employee::new("Bob Jones", "Manager", 90_000.0, 45, 9_876_543_210, "12 Elm Road");
        let rendered = render_table(&[alice(), bob]);

        let alice_at = rendered.find("Alice Smith").unwrap();
        let bob_at = rendered.find("Bob Jones").unwrap();
        assert!(alice_at < bob_at);
        assert!(rendered.contains("75000.00"));
        assert!(rendered.contains("Designation"));
        assert_eq!(rendered.lines().count(), 6);
        assert_aligned(&rendered);
    }

    #[test]
    fn test_table_aligns_wide_characters() {
        let zoe = Employee::new("Zoë Ångström", "Designer", 600.0, 25, 1_112_223_333, "東京");
        let rendered = render_table(&[alice(), zoe]);
        assert_aligned(&rendered);
    }

    #[test]
    fn test_empty_table_has_header_only() {
        let rendered = render_table(&[]);
        assert_eq!(rendered.lines().count(), 4);
        assert!(rendered.contains("Name"));
    }

    #[test]
    fn test_card_fields() {
        let rendered = render_card(3, &alice());
        assert!(rendered.contains("│ ID "));
        assert!(rendered.contains(" 3 "));
        assert!(rendered.contains("221B Baker Street"));
        assert!(rendered.contains("1234567890"));
        assert_eq!(rendered.lines().count(), 9);
        assert_aligned(&rendered);
    }

    #[test]
    fn test_phone_is_zero_padded() {
        let mut employee = alice();
        employee.phone = 123_456_789;
        assert!(render_card(1, &employee).contains("0123456789"));
    }
}

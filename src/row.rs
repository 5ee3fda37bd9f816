use std::fmt;

use byteorder::{ByteOrder, LittleEndian};

use crate::{
    EMAIL_OFFSET, EMAIL_SIZE, ID_OFFSET, ID_SIZE, ROW_SIZE, USERNAME_OFFSET, USERNAME_SIZE,
};

/// A row of the single table. The caller guarantees `username` and `email`
/// fit their columns; `Statement::prepare` rejects anything longer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: u32,
    pub username: String,
    pub email: String,
}

impl Row {
    pub fn new(id: u32, username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            email: email.into(),
        }
    }

    /// Writes the row into `destination`, which must be at least `ROW_SIZE`
    /// bytes. Text columns are zero padded to their full width.
    pub fn serialize(&self, destination: &mut [u8]) {
        let destination = &mut destination[..ROW_SIZE];
        LittleEndian::write_u32(&mut destination[ID_OFFSET..ID_OFFSET + ID_SIZE], self.id);
        write_padded(
            &mut destination[USERNAME_OFFSET..USERNAME_OFFSET + USERNAME_SIZE],
            self.username.as_bytes(),
        );
        write_padded(
            &mut destination[EMAIL_OFFSET..EMAIL_OFFSET + EMAIL_SIZE],
            self.email.as_bytes(),
        );
    }

    pub fn deserialize(source: &[u8]) -> Self {
        let source = &source[..ROW_SIZE];
        Self {
            id: LittleEndian::read_u32(&source[ID_OFFSET..ID_OFFSET + ID_SIZE]),
            username: read_padded(&source[USERNAME_OFFSET..USERNAME_OFFSET + USERNAME_SIZE]),
            email: read_padded(&source[EMAIL_OFFSET..EMAIL_OFFSET + EMAIL_SIZE]),
        }
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.id, self.username, self.email)
    }
}

// A value that fills its column has no terminator on disk.
fn write_padded(field: &mut [u8], value: &[u8]) {
    let len = value.len().min(field.len());
    field[..len].copy_from_slice(&value[..len]);
    field[len..].fill(0);
}

fn read_padded(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_round_trips_a_row() {
        let row = Row::new(42, "alice", "alice@x.com");
        let mut buf = [0xffu8; ROW_SIZE];
        row.serialize(&mut buf);

        assert_eq!(Row::deserialize(&buf), row);
        assert_eq!(&buf[USERNAME_OFFSET + 5..EMAIL_OFFSET], &[0u8; USERNAME_SIZE - 5]);
    }

    #[test]
    fn it_round_trips_strings_of_maximum_length() {
        let row = Row::new(u32::MAX, "u".repeat(USERNAME_SIZE), "e".repeat(EMAIL_SIZE));
        let mut buf = [0u8; ROW_SIZE];
        row.serialize(&mut buf);

        assert_eq!(buf[EMAIL_OFFSET - 1], b'u');
        assert_eq!(buf[EMAIL_OFFSET], b'e');
        assert_eq!(Row::deserialize(&buf), row);
    }

    #[test]
    fn it_stores_the_id_little_endian() {
        let mut buf = [0u8; ROW_SIZE];
        Row::new(0x0102_0304, "", "").serialize(&mut buf);

        assert_eq!(&buf[..ID_SIZE], &[4, 3, 2, 1]);
    }

    #[test]
    fn it_formats_like_the_repl_prints_it() {
        let row = Row::new(1, "user1", "person1@example.com");

        assert_eq!(row.to_string(), "(1, user1, person1@example.com)");
    }
}

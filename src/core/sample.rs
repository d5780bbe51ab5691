use crate::utils::error::{LinkGenError, Result};

/// Campaign message used when none is supplied.
pub const DEFAULT_MESSAGE: &str = "Hola 👋 vi la invitación ROMPIENDO EL TECHO. Quiero ir el 27. \
Soy {NOMBRE}. ¿Me guardan puesto?\n\n#LaAlianza #LaAlianzaOrito #Orito";

/// Name shown in single-link previews when none is given.
pub const DEFAULT_PREVIEW_NAME: &str = "Carlos";

pub const SAMPLE_FILE_NAME: &str = "sample_contacts.csv";

const SAMPLE_ROWS: [[&str; 3]; 3] = [
    ["María", "+57 310 123 4567", "Rompiendo el Techo"],
    ["Juan", "3027248068", "Reunión Jueves"],
    ["Luisa", "(+57) 311-555-7788", "Encuentro Jóvenes"],
];

/// Starter contacts file staff can fill in.
pub fn sample_contacts_csv() -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["NOMBRE", "TELEFONO", "ETIQUETA"])?;
    for row in SAMPLE_ROWS {
        writer.write_record(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| LinkGenError::IoError(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::template::placeholders;
    use crate::domain::model::{ContactTable, PHONE_COLUMN};

    #[test]
    fn test_sample_reads_back_as_contacts() {
        let table = ContactTable::from_csv_bytes(&sample_contacts_csv().unwrap()).unwrap();
        assert!(table.has_column(PHONE_COLUMN));
        assert_eq!(table.len(), 3);
        assert_eq!(table.rows[2].phone(), "(+57) 311-555-7788");
        assert_eq!(table.rows[0].get("NOMBRE"), Some("María"));
    }

    #[test]
    fn test_default_message_uses_name_only() {
        assert_eq!(placeholders(DEFAULT_MESSAGE), vec!["NOMBRE".to_string()]);
        assert!(DEFAULT_MESSAGE.contains("\n\n#LaAlianza"));
    }
}

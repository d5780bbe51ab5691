use crate::core::qr::QrEncoder;
use crate::domain::model::LinkRecord;
use crate::utils::error::{LinkGenError, Result};
use chrono::NaiveDateTime;
use std::collections::HashSet;
use std::io::{Cursor, Write};
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

pub const LINKS_CSV_NAME: &str = "links.csv";
pub const LINKS_CSV_HEADER: [&str; 3] = ["FILA", "TELEFONO_E164", "LINK"];

/// `FILA,TELEFONO_E164,LINK`, header included even when there are no records.
pub fn links_csv(records: &[LinkRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(LINKS_CSV_HEADER)?;
    for record in records {
        writer.serialize(record)?;
    }

    writer
        .into_inner()
        .map_err(|e| LinkGenError::IoError(e.into_error()))
}

pub fn archive_file_name(at: NaiveDateTime) -> String {
    format!("qr_links_{}.zip", at.format("%Y%m%d_%H%M%S"))
}

#[derive(Debug, Clone, Default)]
pub struct Archive {
    pub bytes: Vec<u8>,
    pub qr_images: usize,
    /// Rows whose link could not be encoded as a QR symbol.
    pub qr_failed_rows: Vec<usize>,
    pub qr_available: bool,
}

/// One `qr_{phone}.png` per record plus the links CSV. A phone that repeats
/// gets its row number appended so no entry is overwritten.
pub fn build_archive(records: &[LinkRecord], csv: &[u8], encoder: &QrEncoder) -> Result<Archive> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let png_options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let mut archive = Archive {
        qr_available: QrEncoder::is_available(),
        ..Archive::default()
    };
    let mut used_names: HashSet<String> = HashSet::new();

    if archive.qr_available {
        for record in records {
            let image = match encoder.encode(&record.link) {
                Ok(Some(image)) => image,
                Ok(None) => {
                    archive.qr_available = false;
                    break;
                }
                Err(e) => {
                    tracing::warn!("⚠️ Row {}: QR skipped: {}", record.row, e);
                    archive.qr_failed_rows.push(record.row);
                    continue;
                }
            };

            let mut name = format!("qr_{}.png", record.phone);
            if !used_names.insert(name.clone()) {
                name = format!("qr_{}_{}.png", record.phone, record.row);
                used_names.insert(name.clone());
            }

            zip.start_file(name.as_str(), png_options)?;
            zip.write_all(&image.to_png()?)?;
            archive.qr_images += 1;
        }
    }

    if !archive.qr_available {
        tracing::warn!("⚠️ QR backend unavailable, archive will only contain {}", LINKS_CSV_NAME);
    }

    zip.start_file(LINKS_CSV_NAME, SimpleFileOptions::default())?;
    zip.write_all(csv)?;

    archive.bytes = zip.finish()?.into_inner();
    tracing::debug!(
        "Archive built: {} QR images, {} bytes",
        archive.qr_images,
        archive.bytes.len()
    );
    Ok(archive)
}

use crate::domain::model::LoadReport;
use crate::utils::error::{ErrorSeverity, LinkGenError, Result};

/// Exit status for a failed run, by severity.
pub fn exit_code(error: &LinkGenError) -> i32 {
    match error.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

/// Logs the failure, tells the user what to do, and returns the exit status.
/// Non-fatal errors are reported as warnings.
pub fn report_failure(error: &LinkGenError) -> i32 {
    if error.is_fatal() {
        tracing::error!(
            "❌ Link generation failed: {} (Category: {:?}, Severity: {:?})",
            error,
            error.category(),
            error.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", error.recovery_suggestion());
        eprintln!("❌ {}", error.user_friendly_message());
    } else {
        tracing::warn!("⚠️ {} (Category: {:?})", error, error.category());
        eprintln!("⚠️ {}", error.user_friendly_message());
    }
    eprintln!("💡 Sugerencia: {}", error.recovery_suggestion());
    exit_code(error)
}

pub fn render_report(report: &LoadReport) -> String {
    let summary = &report.summary;
    let mut lines = vec![format!("✅ Links generados: {}", summary.generated)];

    if !summary.invalid_phone_rows.is_empty() {
        lines.push(format!(
            "⚠️ {} filas con teléfono inválido: {:?}",
            summary.invalid_phone_rows.len(),
            summary.invalid_phone_rows
        ));
    }
    if !summary.skipped_rows.is_empty() {
        let rows: Vec<String> = summary
            .skipped_rows
            .iter()
            .map(|s| format!("{} ({})", s.row, s.variable))
            .collect();
        lines.push(format!(
            "⚠️ {} filas omitidas por variables faltantes: {}",
            summary.skipped_rows.len(),
            rows.join(", ")
        ));
    }

    lines.push(format!("📁 {}", report.links_csv_path));
    if let Some(archive) = &report.archive_path {
        lines.push(format!("📦 {} ({} QR)", archive, summary.qr_images));
    }
    lines.join("\n")
}

pub fn print_report(report: &LoadReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{}", render_report(report));
    }
    Ok(())
}

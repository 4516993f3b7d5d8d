use anyhow::Context;
use qsfit_core::domain::FitResult;
use serde::Serialize;
use std::fs;
use std::path::Path;

pub(super) fn load_record(path: &Path) -> anyhow::Result<serde_json::Value> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read sweep record '{}'", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("sweep record '{}' is not valid JSON", path.display()))
}

pub(super) fn write_json_report<T: Serialize>(path: &Path, report: &T) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create report directory '{}'", parent.display())
            })?;
        }
    }
    let rendered =
        serde_json::to_string_pretty(report).context("failed to serialize fit report")?;
    fs::write(path, rendered + "\n")
        .with_context(|| format!("failed to write report '{}'", path.display()))
}

pub(super) fn render_fit_summary(qubit_type: &str, result: &FitResult) -> String {
    let mut summary = format!(
        "qubit type:      {qubit_type}\n\
         period:          {:.6e}\n\
         sweet spot:      {:.6e}\n\
         max frequency:   {:.6e} Hz\n\
         asymmetry d:     {:.4}\n\
         alpha:           {:.4} GHz\n\
         loss:            {:.4e}",
        result.period,
        result.sweet_spot,
        result.frequency_hz,
        result.asymmetry,
        result.alpha_ghz,
        result.loss,
    );
    if result.degenerate {
        summary.push_str("\nwarning:         degenerate fit, parameters are not meaningful");
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::{load_record, render_fit_summary, write_json_report};
    use qsfit_core::domain::FitResult;
    use tempfile::TempDir;

    fn sample_result(degenerate: bool) -> FitResult {
        FitResult {
            period: 1e-3,
            sweet_spot: 0.0,
            frequency_hz: 5.0e9,
            asymmetry: 0.5,
            alpha_ghz: 0.11,
            loss: 1.2e-8,
            degenerate,
        }
    }

    #[test]
    fn summary_mentions_degeneracy_only_when_flagged() {
        let clean = render_fit_summary("transmon", &sample_result(false));
        assert!(clean.contains("transmon"));
        assert!(!clean.contains("degenerate"));

        let flagged = render_fit_summary("transmon", &sample_result(true));
        assert!(flagged.contains("degenerate fit"));
    }

    #[test]
    fn report_round_trips_through_the_filesystem() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("reports/fit.json");
        write_json_report(&path, &sample_result(false)).expect("report should write");

        let raw = std::fs::read_to_string(&path).expect("report should be readable");
        let parsed: FitResult = serde_json::from_str(&raw).expect("report should parse");
        assert_eq!(parsed, sample_result(false));
    }

    #[test]
    fn unreadable_records_fail_with_path_context() {
        let error = load_record(std::path::Path::new("/nonexistent/record.json"))
            .expect_err("missing file should fail");
        assert!(error.to_string().contains("/nonexistent/record.json"));
    }
}

mod common;

use chrono::Datelike;
use std::sync::atomic::Ordering;

use common::{column, harness, MockSpreadsheet, APPROVER};
use voucher_server::voucher::models::VoucherForm;
use voucher_server::voucher::submission::{submit_voucher, SubmissionError};

fn form(filter: &str, voucher_no: &str) -> VoucherForm {
    VoucherForm {
        filter: filter.to_string(),
        date: "2025-03-14".to_string(),
        voucher_no: voucher_no.to_string(),
        pay_to: "Acme Stationers".to_string(),
        account_head: "Office Supplies".to_string(),
        account: "Printer cartridges".to_string(),
        amount: "1250".to_string(),
        amount_rs: "One thousand two hundred fifty only".to_string(),
        checked_by: "Bob".to_string(),
        approved_by: "Carol".to_string(),
        ..Default::default()
    }
}

fn signature_data_url() -> String {
    use base64::Engine;
    use printpdf::image_crate::{DynamicImage, ImageOutputFormat, Rgba, RgbaImage};

    let image = RgbaImage::from_pixel(30, 12, Rgba([20, 20, 120, 200]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut std::io::Cursor::new(&mut bytes), ImageOutputFormat::Png)
        .unwrap();
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

fn document_dir_is_empty(dir: &std::path::Path) -> bool {
    std::fs::read_dir(dir).unwrap().next().is_none()
}

#[tokio::test]
async fn test_first_submission_creates_tab_header_and_row() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness(MockSpreadsheet::new(), dir.path());

    let outcome = submit_voucher(&h.state, form("Surfboard", "SU-2025-001"))
        .await
        .unwrap();

    assert_eq!(outcome.sheet_url, "https://docs.google.com/spreadsheets/d/sheet-su/edit");
    assert_eq!(outcome.pdf_file_id, "file-1");
    assert_eq!(h.sheets.tabs_added.load(Ordering::SeqCst), 1);

    let rows = h.sheets.rows("Surfboard");
    assert_eq!(rows.len(), 2);
    assert_eq!(
        rows[0],
        vec![
            "Voucher No.", "Date", "Filter", "Pay to", "Account Head", "Towards", "The Sum",
            "Amount Rs.", "Checked By", "Approved By", "Receiver Signature", "PDF Link",
        ]
    );
    assert_eq!(rows[1][0], "SU-2025-001");
    assert_eq!(rows[1][2], "Surfboard");
    assert_eq!(rows[1][10], "");
    assert_eq!(rows[1][11], "https://drive.example.com/file-1/view");

    assert_eq!(h.storage.uploaded(), vec!["Surfboard_SU-2025-001.pdf"]);
    let pdf = h.storage.data("Surfboard_SU-2025-001.pdf").unwrap();
    assert!(pdf.starts_with(b"%PDF"));
    assert!(document_dir_is_empty(dir.path()));
}

#[tokio::test]
async fn test_existing_tab_gets_one_row_and_no_new_tab() {
    let dir = tempfile::tempdir().unwrap();
    let sheets = MockSpreadsheet::new()
        .with_tab("Contentstack", column(&["Voucher No.", "CO-2025-001"]));
    let h = harness(sheets, dir.path());

    submit_voucher(&h.state, form("Contentstack", "CO-2025-002"))
        .await
        .unwrap();

    assert_eq!(h.sheets.tabs_added.load(Ordering::SeqCst), 0);
    assert_eq!(h.sheets.writes.load(Ordering::SeqCst), 0);
    let rows = h.sheets.rows("Contentstack");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2][0], "CO-2025-002");
}

#[tokio::test]
async fn test_optional_fields_follow_category_profile() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness(MockSpreadsheet::new(), dir.path());

    let mut form = form("RawEngineering", "RA-2025-001");
    form.paid_by = Some("Petty cash".to_string());
    form.prepared_by = Some("Dave".to_string());
    submit_voucher(&h.state, form).await.unwrap();

    let rows = h.sheets.rows("RawEngineering");
    assert_eq!(rows[0].len(), 14);
    assert_eq!(rows[0][5], "Paid by");
    assert_eq!(rows[1][5], "Petty cash");
    let prepared = rows[0].iter().position(|c| c == "Prepared By").unwrap();
    assert_eq!(rows[1][prepared], "Dave");
}

#[tokio::test]
async fn test_signature_recorded_as_signed() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness(MockSpreadsheet::new(), dir.path());

    let mut form = form("Surfboard", "SU-2025-001");
    form.receiver_signature = Some(signature_data_url());
    submit_voucher(&h.state, form).await.unwrap();

    let rows = h.sheets.rows("Surfboard");
    assert_eq!(rows[1][10], "Signed");
    assert!(!rows[1].iter().any(|cell| cell.starts_with("data:")));
}

#[tokio::test]
async fn test_bad_signature_is_render_failure() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness(MockSpreadsheet::new(), dir.path());

    let mut form = form("Surfboard", "SU-2025-001");
    form.receiver_signature = Some("data:image/png;base64,bm90IGFuIGltYWdl".to_string());
    let err = submit_voucher(&h.state, form).await.unwrap_err();

    assert!(matches!(err, SubmissionError::Render(_)));
    assert_eq!(err.public_message(), "Failed to create PDF");
    assert!(h.storage.uploaded().is_empty());
    assert_eq!(h.sheets.appends.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_upload_failure_appends_nothing_and_removes_file() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness(MockSpreadsheet::new(), dir.path());
    h.storage.fail_uploads.store(true, Ordering::SeqCst);

    let err = submit_voucher(&h.state, form("Surfboard", "SU-2025-001"))
        .await
        .unwrap_err();

    assert!(matches!(err, SubmissionError::Upload(_)));
    assert_eq!(h.sheets.appends.load(Ordering::SeqCst), 0);
    assert!(document_dir_is_empty(dir.path()));
    assert!(h.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_append_failure_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness(MockSpreadsheet::new(), dir.path());
    h.sheets.fail_appends.store(true, Ordering::SeqCst);

    let err = submit_voucher(&h.state, form("Surfboard", "SU-2025-001"))
        .await
        .unwrap_err();

    assert!(matches!(err, SubmissionError::Append(_)));
    assert_eq!(err.public_message(), "Failed to record voucher");
    assert!(h.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_approver_is_notified() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness(MockSpreadsheet::new(), dir.path());

    submit_voucher(&h.state, form("Surfboard", "SU-2025-001"))
        .await
        .unwrap();

    let sent = h.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, APPROVER);
    assert_eq!(sent[0].subject, "Voucher SU-2025-001 Submitted for Approval");
    assert!(sent[0].body.contains("https://docs.google.com/spreadsheets/d/sheet-su/edit"));
    assert!(sent[0].body.contains("https://drive.example.com/file-1/view"));
}

#[tokio::test]
async fn test_notify_failure_still_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness(MockSpreadsheet::new(), dir.path());
    h.notifier.fail.store(true, Ordering::SeqCst);

    let outcome = submit_voucher(&h.state, form("Surfboard", "SU-2025-001")).await;

    assert!(outcome.is_ok());
    assert_eq!(h.sheets.rows("Surfboard").len(), 2);
}

#[tokio::test]
async fn test_unknown_category_makes_no_calls() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness(MockSpreadsheet::new(), dir.path());

    let err = submit_voucher(&h.state, form("Nope", "XX-2025-001"))
        .await
        .unwrap_err();

    assert!(matches!(err, SubmissionError::InvalidCategory(_)));
    assert_eq!(h.sheets.total_calls(), 0);
    assert!(h.storage.uploaded().is_empty());
}

#[tokio::test]
async fn test_blank_voucher_number_is_allocated() {
    let dir = tempfile::tempdir().unwrap();
    let year = chrono::Local::now().year();
    let last = format!("SU-{}-041", year);
    let sheets = MockSpreadsheet::new().with_tab("Surfboard", column(&["Voucher No.", &last]));
    let h = harness(sheets, dir.path());

    let outcome = submit_voucher(&h.state, form("Surfboard", "  ")).await.unwrap();

    assert_eq!(outcome.voucher_no, format!("SU-{}-042", year));
    assert_eq!(h.sheets.rows("Surfboard")[2][0], outcome.voucher_no);
}

#[tokio::test]
async fn test_concurrent_first_submissions_create_one_tab() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness(MockSpreadsheet::new(), dir.path());

    let first = submit_voucher(&h.state, form("Surfboard", "SU-2025-001"));
    let second = submit_voucher(&h.state, form("Surfboard", "SU-2025-002"));
    let (a, b) = tokio::join!(first, second);
    a.unwrap();
    b.unwrap();

    assert_eq!(h.sheets.tabs_added.load(Ordering::SeqCst), 1);
    let rows = h.sheets.rows("Surfboard");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0][0], "Voucher No.");
}

#[tokio::test]
async fn test_concurrent_submissions_with_same_number_use_separate_files() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness(MockSpreadsheet::new(), dir.path());

    let mut other = form("Surfboard", "SU-2025-007");
    other.pay_to = "Initech".to_string();
    let (a, b) = tokio::join!(
        submit_voucher(&h.state, form("Surfboard", "SU-2025-007")),
        submit_voucher(&h.state, other),
    );
    a.unwrap();
    b.unwrap();

    assert_eq!(
        h.storage.uploaded(),
        vec!["Surfboard_SU-2025-007.pdf", "Surfboard_SU-2025-007.pdf"]
    );
    assert_eq!(h.sheets.rows("Surfboard").len(), 3);
    assert!(document_dir_is_empty(dir.path()));
}

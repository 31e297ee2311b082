use std::io::BufWriter;
use std::path::{Path, PathBuf};

use printpdf::image_crate::{self, DynamicImage, GenericImageView};
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Point, Pt,
};

use super::signature::{flatten_on_white, signature_image};
use super::ReceiptError;
use crate::voucher::models::Voucher;
use crate::voucher::profile::{VoucherField, VoucherProfile};

// US Letter, in points measured from the top-left corner.
const PAGE_W: f32 = 612.0;
const PAGE_H: f32 = 792.0;
const FONT_SIZE: f32 = 12.0;
/// Distance from the top of a text line to its baseline.
const BASELINE: f32 = 10.0;

const LOGO_X: f32 = 30.0;
const LOGO_Y: f32 = 30.0;
const IMAGE_WIDTH: f32 = 100.0;

const FIRST_ROW_Y: f32 = 160.0;
const ROW_GAP: f32 = 40.0;
const LABEL_X: f32 = 30.0;
const VALUE_X: f32 = 130.0;
const RULE_FROM: f32 = 120.0;
const RULE_TO: f32 = 550.0;

const SIGNATURE_GAP: f32 = 65.0;
const SIGNATURE_LINE: f32 = 100.0;
const SIGNATURE_IMAGE_LIFT: f32 = 20.0;

/// One labelled, underlined row of the receipt body.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyRow<'a> {
    pub label: &'static str,
    pub value: &'a str,
    pub y: f32,
}

/// A signature slot: underline starting at `x`, label beneath it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignatureSlot {
    pub label: &'static str,
    pub x: f32,
}

pub fn body_rows<'a>(voucher: &'a Voucher, profile: &VoucherProfile) -> Vec<BodyRow<'a>> {
    let mut entries: Vec<(&'static str, &'a str)> = vec![
        ("Pay to:", voucher.pay_to.as_str()),
        ("Account Head:", voucher.account_head.as_str()),
    ];
    if profile.includes(VoucherField::PaidBy) {
        entries.push(("Paid By:", voucher.paid_by.as_deref().unwrap_or("")));
    }
    entries.push(("Towards:", voucher.towards.as_str()));
    entries.push(("Amount Rs.", voucher.amount.as_str()));
    entries.push(("The Sum.", voucher.amount_in_words.as_str()));

    entries
        .into_iter()
        .enumerate()
        .map(|(i, (label, value))| BodyRow {
            label,
            value,
            y: FIRST_ROW_Y + ROW_GAP * i as f32,
        })
        .collect()
}

pub fn signature_slots(profile: &VoucherProfile) -> Vec<SignatureSlot> {
    if profile.signer_count() == 4 {
        vec![
            SignatureSlot { label: "Prepared By", x: 30.0 },
            SignatureSlot { label: "Checked By", x: 175.0 },
            SignatureSlot { label: "Approved By", x: 320.0 },
            SignatureSlot { label: "Receiver Signature", x: 465.0 },
        ]
    } else {
        vec![
            SignatureSlot { label: "Checked By", x: 50.0 },
            SignatureSlot { label: "Approved By", x: 250.0 },
            SignatureSlot { label: "Receiver Signature", x: 450.0 },
        ]
    }
}

/// Drawing surface addressed in top-left points.
struct Canvas {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
}

impl Canvas {
    fn new(title: &str) -> Result<Self, ReceiptError> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm::from(Pt(PAGE_W)), Mm::from(Pt(PAGE_H)), "Layer 1");
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ReceiptError::Pdf(format!("{e:?}")))?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self { doc, layer, font })
    }

    fn point(x: f32, y: f32) -> Point {
        Point::new(Mm::from(Pt(x)), Mm::from(Pt(PAGE_H - y)))
    }

    fn text(&self, s: &str, x: f32, y: f32) {
        if s.is_empty() {
            return;
        }
        self.layer.use_text(
            s,
            FONT_SIZE,
            Mm::from(Pt(x)),
            Mm::from(Pt(PAGE_H - y - BASELINE)),
            &self.font,
        );
    }

    fn hline(&self, x1: f32, x2: f32, y: f32) {
        self.layer.set_outline_thickness(1.0);
        self.layer.add_line(Line {
            points: vec![(Self::point(x1, y), false), (Self::point(x2, y), false)],
            is_closed: false,
        });
    }

    /// Place `image` with its top-left corner at (x, y), scaled to `width`.
    fn image(&self, image: &DynamicImage, x: f32, y: f32, width: f32) {
        let (w_px, h_px) = image.dimensions();
        if w_px == 0 || h_px == 0 {
            return;
        }
        let height = width * h_px as f32 / w_px as f32;
        Image::from_dynamic_image(image).add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm::from(Pt(x))),
                translate_y: Some(Mm::from(Pt(PAGE_H - y - height))),
                dpi: Some(w_px as f32 * 72.0 / width),
                ..Default::default()
            },
        );
    }

    fn into_bytes(self) -> Result<Vec<u8>, ReceiptError> {
        let mut buf = BufWriter::new(Vec::new());
        self.doc
            .save(&mut buf)
            .map_err(|e| ReceiptError::Pdf(format!("{e:?}")))?;
        buf.into_inner()
            .map_err(|e| ReceiptError::Pdf(e.to_string()))
    }
}

/// Renders the one-page voucher receipt.
#[derive(Debug, Clone)]
pub struct ReceiptRenderer {
    public_dir: PathBuf,
}

impl ReceiptRenderer {
    pub fn new(public_dir: impl Into<PathBuf>) -> Self {
        Self {
            public_dir: public_dir.into(),
        }
    }

    pub fn render(
        &self,
        voucher: &Voucher,
        profile: &VoucherProfile,
    ) -> Result<Vec<u8>, ReceiptError> {
        // Decode first so a bad signature fails before any drawing.
        let signature = voucher
            .receiver_signature
            .as_deref()
            .map(signature_image)
            .transpose()?;

        let canvas = Canvas::new(&format!("Voucher {}", voucher.voucher_no))?;

        if let Some(logo) = self.load_logo(voucher) {
            canvas.image(&logo, LOGO_X, LOGO_Y, IMAGE_WIDTH);
        }

        canvas.text("Date:", 400.0, 20.0);
        canvas.text(&voucher.date, 440.0, 20.0);
        canvas.hline(440.0, 550.0, 35.0);

        canvas.text("Voucher No:", 400.0, 40.0);
        canvas.text(&voucher.voucher_no, 470.0, 40.0);
        canvas.hline(440.0, 550.0, 55.0);

        let rows = body_rows(voucher, profile);
        for row in &rows {
            canvas.text(row.label, LABEL_X, row.y);
            canvas.hline(RULE_FROM, RULE_TO, row.y + 12.0);
            canvas.text(row.value, VALUE_X, row.y);
        }

        let last_row = rows.last().map(|r| r.y).unwrap_or(FIRST_ROW_Y);
        let signature_y = last_row + SIGNATURE_GAP;
        let slots = signature_slots(profile);
        for slot in &slots {
            canvas.hline(slot.x, slot.x + SIGNATURE_LINE, signature_y);
            canvas.text(slot.label, slot.x, signature_y + 5.0);
        }

        if let (Some(image), Some(receiver)) = (signature, slots.last()) {
            canvas.image(
                &image,
                receiver.x,
                signature_y - SIGNATURE_IMAGE_LIFT,
                IMAGE_WIDTH,
            );
        }

        canvas.into_bytes()
    }

    fn load_logo(&self, voucher: &Voucher) -> Option<DynamicImage> {
        let path = self.public_dir.join(voucher.category.logo_file());
        if !path.exists() {
            log::warn!("Logo {} not found, rendering without it", path.display());
            return None;
        }
        match read_image(&path) {
            Ok(image) => Some(flatten_on_white(&image)),
            Err(e) => {
                log::warn!("Skipping logo {}: {}", path.display(), e);
                None
            }
        }
    }
}

fn read_image(path: &Path) -> Result<DynamicImage, String> {
    let bytes = std::fs::read(path).map_err(|e| e.to_string())?;
    image_crate::load_from_memory(&bytes).map_err(|e| e.to_string())
}

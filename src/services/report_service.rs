// ==================== REPORTS ====================
// CSV exports of both collections and a one-page PDF summary per event.

use crate::{
    models::{Event, Student},
    utils::AppError,
};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};

const STUDENT_HEADER: [&str; 9] = [
    "id", "name", "rollNumber", "email", "phone", "department", "batch", "section", "participations",
];
const EVENT_HEADER: [&str; 9] = [
    "id", "title", "date", "location", "organizer", "status", "fundSpent", "winners", "attachments",
];

pub fn students_csv(students: &[Student]) -> String {
    let mut out = csv_line(STUDENT_HEADER.iter().map(|s| s.to_string()));
    for s in students {
        out.push_str(&csv_line([
            s.id.clone(),
            s.name.clone(),
            s.roll_number.clone(),
            s.email.clone(),
            s.phone.clone().unwrap_or_default(),
            s.department.clone().unwrap_or_default(),
            s.batch.clone(),
            s.section.clone().unwrap_or_default(),
            s.participations.len().to_string(),
        ]));
    }
    out
}

pub fn events_csv(events: &[Event]) -> String {
    let mut out = csv_line(EVENT_HEADER.iter().map(|s| s.to_string()));
    for e in events {
        let winners = e
            .winners
            .iter()
            .map(|w| format!("{}:{}", w.position, w.student_name))
            .collect::<Vec<_>>()
            .join("; ");

        out.push_str(&csv_line([
            e.id.clone(),
            e.title.clone(),
            e.date.to_string(),
            e.location.clone(),
            e.organizer.clone().unwrap_or_default(),
            e.status.to_string(),
            format!("{:.2}", e.fund_spent),
            winners,
            e.attachments.join(" "),
        ]));
    }
    out
}

fn csv_line(fields: impl IntoIterator<Item = String>) -> String {
    let mut line = fields
        .into_iter()
        .map(|f| csv_field(&f))
        .collect::<Vec<_>>()
        .join(",");
    line.push_str("\r\n");
    line
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Renders a single A4 page summarising the event and its winners.
pub fn event_report_pdf(event: &Event) -> Result<Vec<u8>, AppError> {
    let title = format!("Event Report - {}", event.title);
    let (doc, page, layer) = PdfDocument::new(title.as_str(), Mm(210.0), Mm(297.0), "Report");
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| AppError::Report(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| AppError::Report(e.to_string()))?;

    let layer = doc.get_page(page).get_layer(layer);
    let mut writer = PageWriter { layer, y: 270.0 };

    writer.line(&event.title, 20.0, &bold);
    writer.gap(4.0);
    writer.line(&format!("Date: {}", event.date.format("%d %B %Y")), 12.0, &regular);
    writer.line(&format!("Location: {}", event.location), 12.0, &regular);
    if let Some(organizer) = &event.organizer {
        writer.line(&format!("Organizer: {}", organizer), 12.0, &regular);
    }
    writer.line(&format!("Status: {}", event.status), 12.0, &regular);
    writer.line(&format!("Fund spent: {:.2}", event.fund_spent), 12.0, &regular);

    if let Some(description) = &event.description {
        writer.gap(4.0);
        for chunk in wrap(description, 90) {
            writer.line(&chunk, 11.0, &regular);
        }
    }

    writer.gap(6.0);
    writer.line("Winners", 14.0, &bold);
    if event.winners.is_empty() {
        writer.line("No winners recorded.", 11.0, &regular);
    }
    for w in &event.winners {
        let prize = w.prize.as_deref().map(|p| format!(" - {}", p)).unwrap_or_default();
        writer.line(&format!("{}. {}{}", w.position, w.student_name, prize), 11.0, &regular);
    }

    if !event.attachments.is_empty() {
        writer.gap(6.0);
        writer.line(&format!("Attachments: {}", event.attachments.len()), 11.0, &regular);
    }

    doc.save_to_bytes().map_err(|e| AppError::Report(e.to_string()))
}

struct PageWriter {
    layer: PdfLayerReference,
    y: f32,
}

impl PageWriter {
    fn line(&mut self, text: &str, size: f32, font: &IndirectFontRef) {
        // one page only; anything past the bottom margin is dropped
        if self.y < 20.0 {
            return;
        }
        self.layer.use_text(text, size, Mm(20.0), Mm(self.y), font);
        self.y -= size * 0.55;
    }

    fn gap(&mut self, mm: f32) {
        self.y -= mm;
    }
}

fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + word.len() + 1 > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet};

use crate::error::Result;
use crate::models::crew::{CrewRecord, CrewStatus};
use crate::policy::visibility::ClientCrewView;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const TITLE_BG: Color = Color::RGB(0x0B3954);
const HEADER_BG: Color = Color::RGB(0x082A3F);
const SUBTITLE_TEXT: Color = Color::RGB(0x9FB7C9);
const BORDER: Color = Color::RGB(0xD9E2EA);
const ALT_ROW: Color = Color::RGB(0xF4F8FB);

const DATA_START_ROW: u32 = 3;

pub struct ExportService;

/// Cell formats for one data row, alternating background by index.
struct RowFormats {
    base: Format,
    center: Format,
    bold: Format,
    wrap: Format,
}

impl RowFormats {
    fn for_index(idx: usize) -> Self {
        let bg = if idx % 2 == 0 { ALT_ROW } else { Color::White };
        let base = Format::new()
            .set_font_size(10)
            .set_background_color(bg)
            .set_align(FormatAlign::VerticalCenter)
            .set_border(FormatBorder::Thin)
            .set_border_color(BORDER);
        Self {
            center: base.clone().set_align(FormatAlign::Center),
            bold: base.clone().set_bold(),
            wrap: base.clone().set_text_wrap(),
            base,
        }
    }
}

impl ExportService {
    /// Full admin roster, including contact details and internal fields.
    pub fn generate_admin_crew_xlsx(records: &[CrewRecord]) -> Result<Vec<u8>> {
        let columns = [
            ("#", 6.0),
            ("Name", 28.0),
            ("Email", 30.0),
            ("Phone", 18.0),
            ("Rank", 22.0),
            ("Nationality", 16.0),
            ("Date of birth", 14.0),
            ("Location", 20.0),
            ("Available from", 14.0),
            ("Vessel type", 18.0),
            ("Status", 14.0),
            ("Priority", 10.0),
            ("Released", 10.0),
            ("Tags", 26.0),
            ("Documents", 40.0),
            ("Assigned clients", 12.0),
            ("Admin notes", 40.0),
            ("Registered", 18.0),
        ];

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Crew")?;
        write_frame(worksheet, "Crew roster", records.len(), &columns)?;

        for (idx, record) in records.iter().enumerate() {
            let row = DATA_START_ROW + idx as u32;
            let fmt = RowFormats::for_index(idx);
            worksheet.set_row_height(row, 22)?;

            let documents: Vec<&str> = record
                .documents
                .present_slots()
                .iter()
                .map(|slot| slot.as_str())
                .collect();

            worksheet.write_number_with_format(row, 0, (idx + 1) as f64, &fmt.center)?;
            worksheet.write_string_with_format(row, 1, &record.name, &fmt.bold)?;
            worksheet.write_string_with_format(row, 2, &record.email, &fmt.base)?;
            worksheet.write_string_with_format(row, 3, &record.phone, &fmt.base)?;
            worksheet.write_string_with_format(row, 4, record.rank.as_str(), &fmt.base)?;
            worksheet.write_string_with_format(row, 5, &record.nationality, &fmt.base)?;
            worksheet.write_string_with_format(
                row,
                6,
                &record.date_of_birth.format("%Y-%m-%d").to_string(),
                &fmt.center,
            )?;
            worksheet.write_string_with_format(row, 7, or_dash(record.current_location.as_deref()), &fmt.base)?;
            worksheet.write_string_with_format(
                row,
                8,
                &date_or_dash(record.availability_date),
                &fmt.center,
            )?;
            worksheet.write_string_with_format(
                row,
                9,
                record.preferred_vessel_type.map(|v| v.as_str()).unwrap_or("-"),
                &fmt.base,
            )?;
            worksheet.write_string_with_format(row, 10, record.status.as_str(), &status_format(record.status))?;
            worksheet.write_string_with_format(row, 11, yes_no(record.priority), &fmt.center)?;
            worksheet.write_string_with_format(row, 12, yes_no(record.approved_for_clients), &fmt.center)?;
            worksheet.write_string_with_format(row, 13, &record.tags.join(", "), &fmt.wrap)?;
            worksheet.write_string_with_format(row, 14, &documents.join(", "), &fmt.wrap)?;
            worksheet.write_number_with_format(row, 15, record.client_shortlists.len() as f64, &fmt.center)?;
            worksheet.write_string_with_format(row, 16, or_dash(record.admin_notes.as_deref()), &fmt.wrap)?;
            worksheet.write_string_with_format(
                row,
                17,
                &record.created_at.format("%Y-%m-%d %H:%M").to_string(),
                &fmt.center,
            )?;
        }

        freeze_header(worksheet, columns.len(), records.len())?;
        Ok(workbook.save_to_buffer()?)
    }

    /// Client roster built from redacted views only. There is no column for
    /// contact details or the CV.
    pub fn generate_client_crew_xlsx(views: &[ClientCrewView]) -> Result<Vec<u8>> {
        let columns = [
            ("#", 6.0),
            ("Name", 28.0),
            ("Rank", 22.0),
            ("Nationality", 16.0),
            ("Date of birth", 14.0),
            ("Location", 20.0),
            ("Available from", 14.0),
            ("Vessel type", 18.0),
            ("Documents on file", 40.0),
            ("Shortlisted", 12.0),
        ];

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Crew")?;
        write_frame(worksheet, "Available crew", views.len(), &columns)?;

        for (idx, view) in views.iter().enumerate() {
            let row = DATA_START_ROW + idx as u32;
            let fmt = RowFormats::for_index(idx);
            worksheet.set_row_height(row, 22)?;

            let documents: Vec<&str> = view.viewable_documents.iter().map(|slot| slot.as_str()).collect();

            worksheet.write_number_with_format(row, 0, (idx + 1) as f64, &fmt.center)?;
            worksheet.write_string_with_format(row, 1, &view.name, &fmt.bold)?;
            worksheet.write_string_with_format(row, 2, view.rank.as_str(), &fmt.base)?;
            worksheet.write_string_with_format(row, 3, &view.nationality, &fmt.base)?;
            worksheet.write_string_with_format(
                row,
                4,
                &view.date_of_birth.format("%Y-%m-%d").to_string(),
                &fmt.center,
            )?;
            worksheet.write_string_with_format(row, 5, or_dash(view.current_location.as_deref()), &fmt.base)?;
            worksheet.write_string_with_format(row, 6, &date_or_dash(view.availability_date), &fmt.center)?;
            worksheet.write_string_with_format(
                row,
                7,
                view.preferred_vessel_type.map(|v| v.as_str()).unwrap_or("-"),
                &fmt.base,
            )?;
            worksheet.write_string_with_format(row, 8, &documents.join(", "), &fmt.wrap)?;
            worksheet.write_string_with_format(row, 9, yes_no(view.shortlisted), &fmt.center)?;
        }

        freeze_header(worksheet, columns.len(), views.len())?;
        Ok(workbook.save_to_buffer()?)
    }

    pub fn attachment_name(prefix: &str) -> String {
        format!("{}_{}.xlsx", prefix, chrono::Utc::now().format("%Y%m%d"))
    }
}

fn write_frame(
    worksheet: &mut Worksheet,
    title: &str,
    count: usize,
    columns: &[(&str, f64)],
) -> Result<()> {
    let last_col = (columns.len() - 1) as u16;
    for (i, (_, width)) in columns.iter().enumerate() {
        worksheet.set_column_width(i as u16, *width)?;
    }

    let title_format = Format::new()
        .set_font_size(16)
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(TITLE_BG)
        .set_align(FormatAlign::CenterAcross)
        .set_align(FormatAlign::VerticalCenter);
    worksheet.set_row_height(0, 36)?;
    worksheet.merge_range(0, 0, 0, last_col, title, &title_format)?;

    let subtitle_format = Format::new()
        .set_font_size(10)
        .set_italic()
        .set_font_color(SUBTITLE_TEXT)
        .set_background_color(TITLE_BG)
        .set_align(FormatAlign::CenterAcross)
        .set_align(FormatAlign::VerticalCenter);
    let subtitle = format!(
        "Exported {}  |  {} records",
        chrono::Utc::now().format("%Y-%m-%d %H:%M UTC"),
        count
    );
    worksheet.set_row_height(1, 20)?;
    worksheet.merge_range(1, 0, 1, last_col, &subtitle, &subtitle_format)?;

    let header_format = Format::new()
        .set_bold()
        .set_font_size(10)
        .set_font_color(Color::White)
        .set_background_color(HEADER_BG)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_text_wrap()
        .set_border(FormatBorder::Thin)
        .set_border_color(BORDER);
    worksheet.set_row_height(2, 28)?;
    for (i, (name, _)) in columns.iter().enumerate() {
        worksheet.write_string_with_format(2, i as u16, *name, &header_format)?;
    }
    Ok(())
}

fn freeze_header(worksheet: &mut Worksheet, column_count: usize, row_count: usize) -> Result<()> {
    worksheet.set_freeze_panes(DATA_START_ROW, 0)?;
    if row_count > 0 {
        worksheet.autofilter(
            DATA_START_ROW - 1,
            0,
            DATA_START_ROW + row_count as u32 - 1,
            (column_count - 1) as u16,
        )?;
    }
    Ok(())
}

fn status_format(status: CrewStatus) -> Format {
    let color = match status {
        CrewStatus::Pending => Color::RGB(0xF59E0B),
        CrewStatus::Approved => Color::RGB(0x10B981),
        CrewStatus::Rejected => Color::RGB(0xEF4444),
        CrewStatus::MissingDocs => Color::RGB(0x8B5CF6),
    };
    Format::new()
        .set_font_size(10)
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(color)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Thin)
        .set_border_color(BORDER)
}

fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("-")
}

fn date_or_dash(date: Option<chrono::NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

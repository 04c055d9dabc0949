use std::io::Write;

use chrono::{DateTime, Utc};
use taskhub_core::api::FieldMessage;
use taskhub_core::table::{NO_ATTACHMENT, TaskTable};
use taskhub_core::toast::{Toast, ToastKind};
use taskhub_shared::{ProfileDto, TaskDto};
use unicode_width::UnicodeWidthStr;

#[derive(Debug)]
pub struct Renderer<W> {
    out: W,
    color: bool,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    #[tracing::instrument(skip_all, fields(rows = table.len()))]
    pub fn print_task_table(&mut self, table: &TaskTable) -> anyhow::Result<()> {
        if let Some(placeholder) = table.placeholder() {
            writeln!(self.out, "{placeholder}")?;
            return Ok(());
        }

        let headers = vec![
            "ID".to_string(),
            "Title".to_string(),
            "Description".to_string(),
            "Created".to_string(),
            "Attachment".to_string(),
        ];

        let rows = table
            .rows()
            .iter()
            .map(|row| {
                vec![
                    self.paint(&row.id.to_string(), "33"),
                    row.title.clone(),
                    row.description.clone(),
                    row.created.clone(),
                    row.attachment
                        .as_ref()
                        .map(|link| link.file_name.clone())
                        .unwrap_or_else(|| NO_ATTACHMENT.to_string()),
                ]
            })
            .collect();

        write_table(&mut self.out, headers, rows)
    }

    pub fn print_task_info(&mut self, task: &TaskDto, created: &str) -> anyhow::Result<()> {
        let out = &mut self.out;
        writeln!(out, "id          {}", task.id)?;
        writeln!(out, "title       {}", task.title)?;
        writeln!(
            out,
            "description {}",
            task.description.as_deref().unwrap_or_default()
        )?;
        writeln!(out, "created     {created}")?;
        writeln!(
            out,
            "updated     {}",
            format_optional_date(task.updated_at)
        )?;
        match (&task.attachment, task.attachment_file_name()) {
            (Some(url), Some(name)) => writeln!(out, "attachment  {name} ({url})")?,
            _ => writeln!(out, "attachment  {NO_ATTACHMENT}")?,
        }
        Ok(())
    }

    pub fn print_profile(&mut self, profile: &ProfileDto) -> anyhow::Result<()> {
        let out = &mut self.out;
        writeln!(out, "username      {}", profile.username)?;
        writeln!(out, "email         {}", profile.email)?;
        writeln!(out, "full name     {}", profile.full_name)?;
        writeln!(
            out,
            "date of birth {}",
            profile
                .date_of_birth
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        )?;
        writeln!(
            out,
            "address       {}",
            profile.address.as_deref().unwrap_or_default()
        )?;
        writeln!(
            out,
            "gender        {}",
            profile.gender.as_deref().unwrap_or_default()
        )?;
        writeln!(out, "mobile        {}", profile.mobile_number)?;
        writeln!(
            out,
            "member since  {}",
            format_optional_date(profile.created_at)
        )?;
        Ok(())
    }

    pub fn print_toast(&mut self, toast: &Toast) -> anyhow::Result<()> {
        let line = match toast.kind {
            ToastKind::Success => self.paint(&toast.message, "32"),
            ToastKind::Error => self.paint(&toast.message, "31"),
        };
        writeln!(self.out, "{line}")?;
        Ok(())
    }

    pub fn print_messages(&mut self, messages: &[FieldMessage]) -> anyhow::Result<()> {
        for message in messages {
            writeln!(self.out, "  {message}")?;
        }
        Ok(())
    }

    pub fn print_line(&mut self, line: &str) -> anyhow::Result<()> {
        writeln!(self.out, "{line}")?;
        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for (idx, header) in headers.iter().enumerate() {
        write!(writer, "{:width$} ", header, width = widths[idx])?;
    }
    writeln!(writer)?;

    for width in &widths {
        write!(writer, "{:-<width$} ", "", width = *width)?;
    }
    writeln!(writer)?;

    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn format_optional_date(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|date| date.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_default()
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}

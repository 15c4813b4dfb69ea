//! Line-oriented front end over [`Desk`].
//!
//! Each line is one command aimed at the current tab. Failed actions print a notice
//! and the loop carries on; only end of input or `quit` stops it.

use std::io::{BufRead, Write};

use anyhow::Context;

use crate::appointments::AppointmentView;
use crate::desk::appointments_tab::APPOINTMENT_FIELDS;
use crate::desk::guests_tab::GUEST_FIELDS;
use crate::desk::services_tab::SERVICE_FIELDS;
use crate::desk::{Confirm, Desk, Notice, Outcome, TabKind};
use crate::error::AppResult;
use crate::guests::Guest;
use crate::services::{format_price, Service};

const PROMPT_SUFFIX: &str = "> ";

pub const HELP: &str = "\
commands:
  tab guests|services|appointments   switch the current tab
  list                               show the current tab's rows
  select ID                          load a row into the form
  set FIELD VALUE                    edit a form field (blank VALUE empties it)
  form                               show the form
  clear                              empty the form and drop the selection
  add | update | delete              act on the form / selected row
  options                            show the appointment selectors
  help                               this text
  quit                               leave";

/// Reads answers to confirmation questions from the same input as the commands.
struct LinePrompt<'a, R, W> {
    input: &'a mut R,
    out: &'a mut W,
}

impl<R: BufRead, W: Write> Confirm for LinePrompt<'_, R, W> {
    fn confirm(&mut self, question: &str) -> bool {
        if write!(self.out, "{question} [y/N] ").is_err() || self.out.flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(0) | Err(_) => false,
            Ok(_) => is_yes(&answer),
        }
    }
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

pub fn guest_line(guest: &Guest) -> String {
    let f = &guest.fields;
    format!(
        "{:>4}  {}  | born {} | passport {} | phone {} | {} - {} | room {} | {}",
        guest.id,
        guest.full_name(),
        f.birth_date,
        f.passport,
        f.phone,
        f.check_in_date,
        f.check_out_date,
        f.room,
        f.notes
    )
}

pub fn service_line(service: &Service) -> String {
    format!(
        "{:>4}  {}  | {} | {} min | {}",
        service.id,
        service.name,
        format_price(service.price),
        service.duration,
        service.description
    )
}

pub fn appointment_line(view: &AppointmentView) -> String {
    format!(
        "{:>4}  {}  | {} | {} {} | {}",
        view.id, view.guest.label, view.service.label, view.date, view.time, view.status
    )
}

pub fn write_rows<W: Write>(desk: &Desk, tab: TabKind, out: &mut W) -> std::io::Result<()> {
    let lines: Vec<String> = match tab {
        TabKind::Guests => desk.guests.rows().iter().map(guest_line).collect(),
        TabKind::Services => desk.services.rows().iter().map(service_line).collect(),
        TabKind::Appointments => desk
            .appointments
            .rows()
            .iter()
            .map(appointment_line)
            .collect(),
    };
    if lines.is_empty() {
        return writeln!(out, "(no {})", tab.as_str());
    }
    for line in lines {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

pub fn write_form<W: Write>(desk: &Desk, tab: TabKind, out: &mut W) -> std::io::Result<()> {
    let (selected, pairs): (Option<i64>, Vec<(&str, String)>) = match tab {
        TabKind::Guests => {
            let form = &desk.guests.form;
            let values = [
                &form.last_name,
                &form.first_name,
                &form.middle_name,
                &form.birth_date,
                &form.passport,
                &form.phone,
                &form.check_in_date,
                &form.check_out_date,
                &form.room,
                &form.notes,
            ];
            (
                desk.guests.selected(),
                GUEST_FIELDS
                    .iter()
                    .copied()
                    .zip(values.into_iter().cloned())
                    .collect(),
            )
        }
        TabKind::Services => {
            let form = &desk.services.form;
            let values = [&form.name, &form.description, &form.price, &form.duration];
            (
                desk.services.selected(),
                SERVICE_FIELDS
                    .iter()
                    .copied()
                    .zip(values.into_iter().cloned())
                    .collect(),
            )
        }
        TabKind::Appointments => {
            let form = &desk.appointments.form;
            let pick = |choice: &Option<crate::choice::Choice>| {
                choice
                    .as_ref()
                    .map(|c| c.display_label())
                    .unwrap_or_default()
            };
            let values = [
                pick(&form.guest),
                pick(&form.service),
                form.date.clone(),
                form.time.clone(),
                form.status.clone(),
            ];
            (
                desk.appointments.selected(),
                APPOINTMENT_FIELDS.iter().copied().zip(values).collect(),
            )
        }
    };
    match selected {
        Some(id) => writeln!(out, "[{} #{id}]", tab.as_str())?,
        None => writeln!(out, "[{} new]", tab.as_str())?,
    }
    for (field, value) in pairs {
        writeln!(out, "  {field:<15}{value}")?;
    }
    Ok(())
}

fn write_options<W: Write>(desk: &Desk, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "guests:")?;
    for choice in desk.appointments.guest_options() {
        writeln!(out, "  {choice}")?;
    }
    writeln!(out, "services:")?;
    for choice in desk.appointments.service_options() {
        writeln!(out, "  {choice}")?;
    }
    let statuses: Vec<&str> = desk
        .appointments
        .status_options()
        .iter()
        .map(|status| status.as_str())
        .collect();
    writeln!(out, "statuses: {}", statuses.join(", "))
}

fn write_result<W: Write>(result: AppResult<Outcome>, out: &mut W) -> std::io::Result<()> {
    match result {
        Ok(outcome) => match Notice::from_outcome(&outcome) {
            Some(notice) => writeln!(out, "{notice}"),
            None => writeln!(out, "Cancelled."),
        },
        Err(err) => writeln!(out, "{}", Notice::from_error(&err)),
    }
}

fn write_reload_error<W: Write>(desk: &mut Desk, out: &mut W) -> std::io::Result<()> {
    match desk.take_reload_error() {
        Some(err) => writeln!(out, "{}", Notice::reload_failed(&err)),
        None => Ok(()),
    }
}

fn write_unit<W: Write>(result: AppResult<()>, out: &mut W) -> std::io::Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(err) => writeln!(out, "{}", Notice::from_error(&err)),
    }
}

/// Runs commands from `input` until `quit` or end of input.
pub async fn run_shell<R: BufRead, W: Write>(
    desk: &mut Desk,
    mut input: R,
    out: &mut W,
) -> anyhow::Result<()> {
    let mut tab = TabKind::Guests;
    writeln!(out, "Resort desk. Type `help` for commands.")?;

    loop {
        write!(out, "{}{PROMPT_SUFFIX}", tab.as_str())?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line).context("read command")? == 0 {
            writeln!(out)?;
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };
        tracing::debug!(target: "resortdesk", event = "shell_command", command, tab = tab.as_str());

        match command.to_ascii_lowercase().as_str() {
            "quit" | "exit" | "q" => break,
            "help" | "?" => writeln!(out, "{HELP}")?,
            "tab" => match TabKind::parse(rest) {
                Some(kind) => {
                    tab = kind;
                    write_rows(desk, tab, out)?;
                }
                None => writeln!(out, "unknown tab {rest:?}")?,
            },
            "list" => {
                if let Err(err) = desk.refresh().await {
                    writeln!(out, "{}", Notice::from_error(&err))?;
                }
                write_rows(desk, tab, out)?;
            }
            "select" => match rest.parse::<i64>() {
                Ok(id) => {
                    let result = desk.select(tab, id);
                    let selected = result.is_ok();
                    write_unit(result, out)?;
                    if selected {
                        write_form(desk, tab, out)?;
                    }
                }
                Err(_) => writeln!(out, "usage: select ID")?,
            },
            "set" => {
                let (field, value) = match rest.split_once(char::is_whitespace) {
                    Some((field, value)) => (field, value.trim()),
                    None => (rest, ""),
                };
                if field.is_empty() {
                    writeln!(out, "usage: set FIELD VALUE")?;
                } else {
                    write_unit(desk.set_field(tab, field, value), out)?;
                }
            }
            "form" => write_form(desk, tab, out)?,
            "clear" => {
                desk.clear(tab);
                write_form(desk, tab, out)?;
            }
            "add" => {
                let result = desk.add(tab).await;
                write_result(result, out)?;
                write_reload_error(desk, out)?;
            }
            "update" => {
                let result = desk.update(tab).await;
                write_result(result, out)?;
                write_reload_error(desk, out)?;
            }
            "delete" => {
                let result = {
                    let mut prompt = LinePrompt {
                        input: &mut input,
                        out: &mut *out,
                    };
                    desk.delete(tab, &mut prompt).await
                };
                write_result(result, out)?;
                write_reload_error(desk, out)?;
            }
            "options" => write_options(desk, out)?,
            other => writeln!(out, "unknown command {other:?}; type `help`")?,
        }
    }

    tracing::info!(target: "resortdesk", event = "shell_closed");
    Ok(())
}

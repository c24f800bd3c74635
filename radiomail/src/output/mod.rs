use chrono::Local;
use colored::*;
use comfy_table::{Cell, Table};
use radiomail_core::delivery::Delivery;
use radiomail_core::{CommandError, Event, NodeAddress, Reply};
use serde::Serialize;
use serde_json::json;

use crate::utils::{print_error, print_info, print_success, print_warning};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Json,
    Table,
}

/// One JSON object per line, so the console can be scripted.
pub fn print_output<T: Serialize>(data: T) {
    if let Ok(json) = serde_json::to_string(&data) {
        println!("{json}");
    }
}

pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(comfy_table::presets::UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table
}

pub fn render_event(event: &Event, format: OutputFormat) {
    match event {
        Event::MessageArrived(summary) => match format {
            OutputFormat::Json => print_output(json!({
                "event": "message_arrived",
                "message": summary,
            })),
            OutputFormat::Table => print_info(&format!(
                "New message arrived from {from} (index {index})",
                from = summary.from,
                index = summary.index
            )),
        },
        Event::Reply {
            result: Ok(reply), ..
        } => render_reply(reply, format),
        Event::Reply {
            line,
            result: Err(error),
        } => render_error(line, error, format),
    }
}

fn render_error(line: &str, error: &CommandError, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_output(json!({
            "event": "error",
            "kind": error.kind(),
            "message": error.to_string(),
            "line": line,
        })),
        OutputFormat::Table => match error {
            CommandError::InvalidArgument { .. } | CommandError::Transport(_) => print_error(
                &format!("Command failed: '{line}': {error}"),
                error.hint(),
            ),
            _ => print_error(&error.to_string(), error.hint()),
        },
    }
}

fn render_reply(reply: &Reply, format: OutputFormat) {
    if format == OutputFormat::Json {
        print_output(reply);
        return;
    }

    match reply {
        Reply::Compose { to } => println!("Enter message for {to:#x}:"),

        Reply::Inbox { entries } => {
            if entries.is_empty() {
                print_info("Inbox is empty");
                return;
            }
            let mut table = create_table();
            table.set_header(vec![
                Cell::new("Index"),
                Cell::new("From"),
                Cell::new("Message ID"),
                Cell::new("Received"),
            ]);
            for entry in entries {
                table.add_row(vec![
                    Cell::new(entry.index),
                    Cell::new(&entry.from),
                    Cell::new(&entry.message_id),
                    Cell::new(
                        entry
                            .received_at
                            .with_timezone(&Local)
                            .format("%H:%M:%S")
                            .to_string(),
                    ),
                ]);
            }
            println!("{table}");
        }

        Reply::Message { from, text, .. } => {
            println!("{label} {from}", label = "From:".bold());
            println!("{label} {text}", label = "Message:".bold());
        }

        Reply::Deleted { index } => print_success(&format!("Deleted message {index}")),

        Reply::Undelivered { entries } => {
            if entries.is_empty() {
                print_info("No undelivered messages");
                return;
            }
            let mut table = create_table();
            table.set_header(vec![
                Cell::new("Index"),
                Cell::new("To"),
                Cell::new("Message Content"),
            ]);
            for entry in entries {
                table.add_row(vec![
                    Cell::new(entry.index),
                    Cell::new(entry.to),
                    Cell::new(&entry.content),
                ]);
            }
            println!("{table}");
        }

        Reply::Sent { to, delivery, .. } | Reply::Resent { to, delivery, .. } => {
            report_delivery(*to, *delivery)
        }

        Reply::NodeAddress { address } => println!("Node address: {address}"),

        Reply::NodeAddressSet { address } => {
            print_success(&format!("Node address set to {address}"))
        }

        Reply::Help { entries } => {
            let mut table = create_table();
            table.set_header(vec![
                Cell::new("Command"),
                Cell::new("Example"),
                Cell::new("Description"),
            ]);
            for entry in entries {
                table.add_row(vec![
                    Cell::new(entry.usage),
                    Cell::new(entry.example),
                    Cell::new(entry.summary),
                ]);
            }
            println!("{table}");
        }
    }
}

fn report_delivery(to: NodeAddress, delivery: Delivery) {
    match delivery {
        Delivery::Acked => print_success(&format!("Received ACK from {to:#x}")),
        Delivery::Unacked => print_warning(&format!(
            "Did not receive ACK from {to:#x}. Message marked as undelivered."
        )),
    }
}

//! Interactive line loop: one command per line, re-rendering after every
//! command that changed the state.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Result;
use client_core::{CartController, ShopEvent};
use shared::domain::ItemId;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::{self, error::TryRecvError},
};

use crate::render::{render_cart, render_inventory};

pub const HELP: &str = "\
commands:
  + <id> [n]     stage n more (default 1)
  - <id> [n]     stage n fewer (default 1)
  add <id>       commit the staged quantity to the cart
  rm <id>        remove an entry from the cart
  page <n>       jump to page n
  next | prev    move one page
  checkout       delete every cart entry
  refresh        reload inventory and cart
  show           print inventory and cart
  quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellCommand {
    Stage { id: ItemId, delta: i64 },
    Commit(ItemId),
    Remove(ItemId),
    Page(usize),
    Next,
    Prev,
    Checkout,
    Refresh,
    Show,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<ShellCommand, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(ShellCommand::Show);
    };
    let args: Vec<&str> = words.collect();

    let id_arg = || -> Result<ItemId, String> {
        let raw = args.first().ok_or_else(|| format!("'{head}' needs an item id"))?;
        raw.parse::<i64>()
            .map(ItemId)
            .map_err(|_| format!("'{raw}' is not an item id"))
    };
    let count_arg = || -> Result<i64, String> {
        match args.get(1) {
            None => Ok(1),
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| format!("'{raw}' is not a positive count")),
        }
    };

    match head {
        "+" => Ok(ShellCommand::Stage {
            id: id_arg()?,
            delta: count_arg()?,
        }),
        "-" => Ok(ShellCommand::Stage {
            id: id_arg()?,
            delta: -count_arg()?,
        }),
        "add" => Ok(ShellCommand::Commit(id_arg()?)),
        "rm" | "remove" => Ok(ShellCommand::Remove(id_arg()?)),
        "page" => {
            let raw = args.first().ok_or("'page' needs a page number")?;
            raw.parse::<usize>()
                .map(ShellCommand::Page)
                .map_err(|_| format!("'{raw}' is not a page number"))
        }
        "next" => Ok(ShellCommand::Next),
        "prev" => Ok(ShellCommand::Prev),
        "checkout" => Ok(ShellCommand::Checkout),
        "refresh" => Ok(ShellCommand::Refresh),
        "show" => Ok(ShellCommand::Show),
        "help" | "?" => Ok(ShellCommand::Help),
        "quit" | "exit" | "q" => Ok(ShellCommand::Quit),
        other => Err(format!("unknown command '{other}', try 'help'")),
    }
}

pub async fn run(mut controller: CartController) -> Result<()> {
    let dirty = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&dirty);
    controller.subscribe(move || flag.store(true, Ordering::SeqCst));
    let mut events = controller.subscribe_events();

    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        if dirty.swap(false, Ordering::SeqCst) {
            print!("{}", render_inventory(controller.state()));
            print!("{}", render_cart(controller.state()));
        }

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };

        // failures are reported through the event channel below
        match command {
            ShellCommand::Stage { id, delta } => {
                controller.stage_quantity_delta(id, delta);
            }
            ShellCommand::Commit(id) => {
                if let Ok(None) = controller.commit_to_cart(id).await {
                    println!("nothing staged for item {id}");
                }
            }
            ShellCommand::Remove(id) => {
                let _ = controller.remove_from_cart(id).await;
            }
            ShellCommand::Page(page) => {
                controller.change_page(page);
            }
            ShellCommand::Next => {
                let page = controller.state().current_page() + 1;
                controller.change_page(page);
            }
            ShellCommand::Prev => {
                let page = controller.state().current_page().saturating_sub(1);
                controller.change_page(page);
            }
            ShellCommand::Checkout => {
                let _ = controller.checkout().await;
            }
            ShellCommand::Refresh => {
                let _ = controller.load().await;
            }
            ShellCommand::Show => dirty.store(true, Ordering::SeqCst),
            ShellCommand::Help => println!("{HELP}"),
            ShellCommand::Quit => break,
        }

        drain_events(&mut events);
    }

    Ok(())
}

fn drain_events(events: &mut broadcast::Receiver<ShopEvent>) {
    loop {
        match events.try_recv() {
            Ok(ShopEvent::StagedQuantityChanged { id, quantity }) => {
                println!("staged {quantity} of item {id}");
            }
            Ok(ShopEvent::CheckedOut { removed }) => {
                println!("checked out {} cart entries", removed.len());
            }
            Ok(ShopEvent::OperationFailed { operation, message }) => {
                println!("{operation} failed: {message}");
            }
            Err(TryRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "shell fell behind on controller events");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
}

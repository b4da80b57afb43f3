//! Line-oriented front-end over the [`Shell`].
//!
//! Each input line is one [`Command`]. Dialogs read their answer from the same
//! input stream, so a confirmation prompt simply waits for the next line.

use crate::api::{NumberForm, OperatorForm, PlaceForm, PlaceListSort};
use crate::catalog::{CatalogError, Category, OperatorKey};
use crate::pages::{Dialogs, UnsavedChoice};
use crate::shell::{LeaveDecision, Page, Route, Shell};
use crate::usage::UsageSort;
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tokio::sync::Mutex;
use tracing::{debug, warn};

pub mod command;
pub mod render;

pub use command::{Command, CommandError, Fields, Selector};

const SETTLE_LIMIT: Duration = Duration::from_secs(10);
const NOT_HERE: &str = "Команда недоступна на этой странице";
const NO_ROW: &str = "Нет такой строки";

#[derive(Debug, Error)]
pub enum TerminalError {
    #[error("Terminal IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct Console<R, W> {
    lines: Mutex<Lines<R>>,
    out: Mutex<W>,
}

impl Console<BufReader<tokio::io::Stdin>, tokio::io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> Console<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            lines: Mutex::new(reader.lines()),
            out: Mutex::new(writer),
        }
    }

    /// Next input line; `None` at end of input.
    pub async fn read_line(&self) -> Result<Option<String>, TerminalError> {
        Ok(self.lines.lock().await.next_line().await?)
    }

    pub async fn print(&self, text: &str) -> Result<(), TerminalError> {
        let mut out = self.out.lock().await;
        out.write_all(text.as_bytes()).await?;
        if !text.ends_with('\n') {
            out.write_all(b"\n").await?;
        }
        out.flush().await?;
        Ok(())
    }

    async fn ask(&self, prompt: &str) -> Option<String> {
        if let Err(e) = self.print(prompt).await {
            warn!(err = %e, "Failed to print prompt");
        }
        match self.read_line().await {
            Ok(line) => line.map(|l| l.trim().to_lowercase()),
            Err(e) => {
                warn!(err = %e, "Failed to read answer");
                None
            }
        }
    }
}

#[async_trait]
impl<R, W> Dialogs for Console<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn confirm(&self, title: &str, message: &str) -> bool {
        let answer = self.ask(&format!("{}\n{} [y/n]", title, message)).await;
        matches!(answer.as_deref(), Some("y" | "yes" | "д" | "да"))
    }

    async fn alert(&self, message: &str) {
        if let Err(e) = self.print(&format!("! {}", message)).await {
            warn!(err = %e, "Failed to print alert");
        }
    }

    async fn unsaved_choice(&self) -> UnsavedChoice {
        let prompt = format!(
            "{}\n{} [s]ave / [d]iscard / [c]ancel",
            crate::pages::messages::UNSAVED_TITLE,
            crate::pages::messages::UNSAVED
        );
        match self.ask(&prompt).await.as_deref() {
            Some("s" | "save") => UnsavedChoice::Save,
            Some("d" | "discard") => UnsavedChoice::Discard,
            _ => UnsavedChoice::Cancel,
        }
    }
}

enum Flow {
    Stay,
    Say(String),
    Navigate(Route),
    Exit,
}

/// Reads commands until `exit` or end of input.
pub async fn run<R, W>(shell: &mut Shell, console: &Console<R, W>) -> Result<(), TerminalError>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    console.print(&render::shell(shell)).await?;
    while let Some(line) = console.read_line().await? {
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                console.print(&e.to_string()).await?;
                continue;
            }
        };
        debug!(?command, "Terminal command");

        match apply(shell, command, console).await {
            Flow::Stay => {}
            Flow::Say(text) => console.print(&text).await?,
            Flow::Navigate(route) => {
                shell.navigate(route, console).await;
            }
            Flow::Exit => {
                if shell.close(console).await == LeaveDecision::Proceed {
                    break;
                }
            }
        }
        console.print(&render::shell(shell)).await?;
    }
    Ok(())
}

async fn apply(shell: &mut Shell, command: Command, dialogs: &dyn Dialogs) -> Flow {
    match command {
        Command::Go(route) => Flow::Navigate(route),
        Command::Help => Flow::Say(command::HELP.to_string()),
        Command::Exit => Flow::Exit,
        Command::Refresh => {
            shell.reload().await;
            Flow::Stay
        }
        command => apply_to_page(shell.page_mut(), command, dialogs).await,
    }
}

async fn apply_to_page(page: &mut Page, command: Command, dialogs: &dyn Dialogs) -> Flow {
    match (page, command) {
        (Page::Search(p), Command::Query(text)) => {
            p.on_input(&text);
            p.settle(SETTLE_LIMIT).await;
            Flow::Stay
        }
        (Page::Search(p), Command::Submit | Command::Add(_)) => match p.submit() {
            Some(offer) => navigate_to(p.accept_offer(&offer, dialogs).await),
            None => Flow::Say("Нечего добавлять".to_string()),
        },
        (Page::Search(p), Command::Open(n)) => {
            let state = p.state();
            let numbers = state.result.numbers.len();
            if n < numbers {
                Flow::Navigate(Route::NumberDetail(state.result.numbers[n].id))
            } else {
                match state.result.places.get(n - numbers) {
                    Some(place) => Flow::Navigate(Route::PlaceDetail(place.id)),
                    None => Flow::Say(NO_ROW.to_string()),
                }
            }
        }

        (Page::Numbers(p), Command::Open(n)) => row(p.visible().get(n).map(|x| x.id))
            .map_or_else(Flow::Say, |id| Flow::Navigate(Route::NumberDetail(id))),
        (Page::Numbers(p), Command::Add(fields)) => {
            let mut form = p.blank_form();
            if let Err(msg) = apply_number_fields(&mut form, &fields) {
                return Flow::Say(msg);
            }
            p.save(None, &form, dialogs).await;
            Flow::Stay
        }
        (Page::Numbers(p), Command::Edit(Some(n), fields)) => {
            let Some(number) = p.visible().get(n).map(|x| (*x).clone()) else {
                return Flow::Say(NO_ROW.to_string());
            };
            let mut form = NumberForm::from(&number);
            if let Err(msg) = apply_number_fields(&mut form, &fields) {
                return Flow::Say(msg);
            }
            p.save(Some(number.id), &form, dialogs).await;
            Flow::Stay
        }
        (Page::Numbers(p), Command::Delete(Some(n))) => {
            let Some(id) = p.visible().get(n).map(|x| x.id) else {
                return Flow::Say(NO_ROW.to_string());
            };
            p.delete(id, dialogs).await;
            Flow::Stay
        }
        (Page::Numbers(p), Command::Sort(key)) => usage_sort(&key, |s| p.set_sort(s)),
        (Page::Numbers(p), Command::Operator(selector)) => match selector {
            Selector::All => {
                p.select_all_operators();
                Flow::Stay
            }
            Selector::None => {
                p.clear_operators();
                Flow::Stay
            }
            Selector::One(key) => match key.parse::<OperatorKey>() {
                Ok(op) => {
                    p.toggle_operator(op);
                    Flow::Stay
                }
                Err(e) => Flow::Say(e.to_string()),
            },
        },

        (Page::Places(p), Command::Open(n)) => row(p.items().get(n).map(|x| x.id))
            .map_or_else(Flow::Say, |id| Flow::Navigate(Route::PlaceDetail(id))),
        (Page::Places(p), Command::Add(fields)) => {
            let mut form = p.blank_form();
            if let Err(msg) = apply_place_fields(&mut form, &fields) {
                return Flow::Say(msg);
            }
            p.save(None, &form, dialogs).await;
            Flow::Stay
        }
        (Page::Places(p), Command::Edit(Some(n), fields)) => {
            let Some(place) = p.items().get(n).cloned() else {
                return Flow::Say(NO_ROW.to_string());
            };
            let mut form = PlaceForm::from(&place);
            if let Err(msg) = apply_place_fields(&mut form, &fields) {
                return Flow::Say(msg);
            }
            p.save(Some(place.id), &form, dialogs).await;
            Flow::Stay
        }
        (Page::Places(p), Command::Delete(Some(n))) => {
            let Some(id) = p.items().get(n).map(|x| x.id) else {
                return Flow::Say(NO_ROW.to_string());
            };
            p.delete(id, dialogs).await;
            Flow::Stay
        }
        (Page::Places(p), Command::Sort(key)) => match PlaceListSort::from_key(&key) {
            Some(sort) => {
                p.set_sort(sort).await;
                Flow::Stay
            }
            None => Flow::Say(sort_keys(PlaceListSort::ALL.iter().map(|s| s.key()))),
        },
        (Page::Places(p), Command::Category(selector)) => match selector {
            Selector::All | Selector::None => {
                p.set_category(None).await;
                Flow::Stay
            }
            Selector::One(label) => match label.parse::<Category>() {
                Ok(category) => {
                    p.set_category(Some(category)).await;
                    Flow::Stay
                }
                Err(e) => Flow::Say(e.to_string()),
            },
        },

        (Page::NumberDetail(p), Command::Open(n)) => row(p.visible().get(n).map(|x| x.id))
            .map_or_else(Flow::Say, |id| Flow::Navigate(Route::PlaceDetail(id))),
        (Page::NumberDetail(p), Command::Toggle(n)) => {
            let Some((id, used)) = p.board().and_then(|b| {
                p.visible().get(n).map(|x| (x.id, b.is_used(x.id)))
            }) else {
                return Flow::Say(NO_ROW.to_string());
            };
            p.set_usage(id, !used, dialogs).await;
            Flow::Stay
        }
        (Page::NumberDetail(p), Command::Mark(n)) => {
            let Some((id, used)) = p.board().and_then(|b| {
                p.visible().get(n).map(|x| (x.id, b.is_used(x.id)))
            }) else {
                return Flow::Say(NO_ROW.to_string());
            };
            p.stage_usage(id, !used, dialogs).await;
            Flow::Stay
        }
        (Page::NumberDetail(p), Command::Place(n)) => {
            let Some((id, visible)) = p.filter_choices().get(n).map(|(x, v)| (x.id, *v)) else {
                return Flow::Say(NO_ROW.to_string());
            };
            p.set_place_visible(id, !visible);
            Flow::Stay
        }
        (Page::NumberDetail(p), Command::Operator(Selector::All)) => {
            p.show_all_places();
            Flow::Stay
        }
        (Page::NumberDetail(p), Command::Operator(Selector::None)) => {
            p.hide_all_places();
            Flow::Stay
        }
        (Page::NumberDetail(p), Command::Sort(key)) => usage_sort(&key, |s| p.set_sort(s)),
        (Page::NumberDetail(p), Command::Edit(None, fields)) => {
            let Some(mut form) = p.edit_form() else {
                return Flow::Say(NOT_HERE.to_string());
            };
            if let Err(msg) = apply_number_fields(&mut form, &fields) {
                return Flow::Say(msg);
            }
            p.save_edit(&form, dialogs).await;
            Flow::Stay
        }
        (Page::NumberDetail(p), Command::Delete(None)) => navigate_to(p.delete(dialogs).await),

        (Page::PlaceDetail(p), Command::Open(n)) => row(p.visible().get(n).map(|x| x.id))
            .map_or_else(Flow::Say, |id| Flow::Navigate(Route::NumberDetail(id))),
        (Page::PlaceDetail(p), Command::Toggle(n)) => {
            let Some((id, used)) = p.board().and_then(|b| {
                p.visible().get(n).map(|x| (x.id, b.is_used(x.id)))
            }) else {
                return Flow::Say(NO_ROW.to_string());
            };
            p.set_usage(id, !used, dialogs).await;
            Flow::Stay
        }
        (Page::PlaceDetail(p), Command::Mark(n)) => {
            let Some((id, used)) = p.board().and_then(|b| {
                p.visible().get(n).map(|x| (x.id, b.is_used(x.id)))
            }) else {
                return Flow::Say(NO_ROW.to_string());
            };
            p.stage_usage(id, !used, dialogs).await;
            Flow::Stay
        }
        (Page::PlaceDetail(p), Command::Operator(selector)) => match selector {
            Selector::All => {
                p.select_all_operators();
                Flow::Stay
            }
            Selector::None => {
                p.clear_operators();
                Flow::Stay
            }
            Selector::One(key) => match key.parse::<OperatorKey>() {
                Ok(op) => {
                    p.toggle_operator(op);
                    Flow::Stay
                }
                Err(e) => Flow::Say(e.to_string()),
            },
        },
        (Page::PlaceDetail(p), Command::Sort(key)) => usage_sort(&key, |s| p.set_sort(s)),
        (Page::PlaceDetail(p), Command::Promo) => Flow::Say(render::promo(p)),
        (Page::PlaceDetail(p), Command::Edit(None, fields)) => {
            let Some(mut form) = p.edit_form() else {
                return Flow::Say(NOT_HERE.to_string());
            };
            if let Err(msg) = apply_place_fields(&mut form, &fields) {
                return Flow::Say(msg);
            }
            p.save_edit(&form, dialogs).await;
            Flow::Stay
        }
        (Page::PlaceDetail(p), Command::Delete(None)) => navigate_to(p.delete(dialogs).await),

        (Page::Settings(p), Command::Add(fields)) => {
            let form = operator_form(OperatorForm::default(), &fields);
            p.save(None, &form, dialogs).await;
            Flow::Stay
        }
        (Page::Settings(p), Command::Edit(Some(n), fields)) => {
            let Some(id) = p.entries().get(n).and_then(|e| e.id) else {
                return Flow::Say("Встроенного оператора нельзя изменить".to_string());
            };
            let Some(form) = p.form_for(id) else {
                return Flow::Say(NO_ROW.to_string());
            };
            let form = operator_form(form, &fields);
            p.save(Some(id), &form, dialogs).await;
            Flow::Stay
        }

        _ => Flow::Say(NOT_HERE.to_string()),
    }
}

fn navigate_to(route: Option<Route>) -> Flow {
    route.map(Flow::Navigate).unwrap_or(Flow::Stay)
}

fn row<T>(value: Option<T>) -> Result<T, String> {
    value.ok_or_else(|| NO_ROW.to_string())
}

fn usage_sort(key: &str, set: impl FnOnce(UsageSort) -> bool) -> Flow {
    match UsageSort::from_key(key) {
        Some(sort) if set(sort) => Flow::Stay,
        _ => Flow::Say(format!("Неизвестная сортировка: {}", key)),
    }
}

fn sort_keys<'a>(keys: impl Iterator<Item = &'a str>) -> String {
    format!("Сортировки: {}", keys.collect::<Vec<_>>().join(", "))
}

fn catalog_message(e: CatalogError) -> String {
    e.to_string()
}

pub fn apply_number_fields(form: &mut NumberForm, fields: &Fields) -> Result<(), String> {
    if let Some(phone) = fields.get("phone") {
        form.set_phone(phone);
    }
    if let Some(op) = fields.get("operator") {
        form.operator_key = op.parse::<OperatorKey>().map_err(catalog_message)?;
    }
    Ok(())
}

pub fn apply_place_fields(form: &mut PlaceForm, fields: &Fields) -> Result<(), String> {
    if let Some(name) = fields.get("name") {
        form.name = name.to_string();
    }
    if let Some(category) = fields.get("category") {
        form.category = category.parse::<Category>().map_err(catalog_message)?;
    }
    if let Some(code) = fields.get("promo") {
        form.promo_code = code.to_string();
    }
    if let Some(code) = fields.get("promo2") {
        form.promo_code2 = code.to_string();
    }
    if let Some(url) = fields.get("url") {
        form.promo_url = url.to_string();
    }
    if let Some(comment) = fields.get("comment") {
        form.comment = comment.to_string();
    }
    if let Some(logo) = fields.get("logo").filter(|l| !l.is_empty()) {
        form.logo = Some(PathBuf::from(logo));
    }
    form.remove_logo = fields.has("removelogo");
    Ok(())
}

fn operator_form(mut form: OperatorForm, fields: &Fields) -> OperatorForm {
    if let Some(name) = fields.get("name") {
        form.name = name.to_string();
    }
    if let Some(logo) = fields.get("logo").filter(|l| !l.is_empty()) {
        form.logo = Some(PathBuf::from(logo));
    }
    form
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::configuration::Config;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_place_fields() {
        let mut form = PlaceForm::new("Лента", Category::Shops);
        let fields = Fields::parse("category=Аптеки; promo2=EXTRA; removelogo").unwrap();
        apply_place_fields(&mut form, &fields).unwrap();
        assert_eq!(form.name, "Лента");
        assert_eq!(form.category, Category::Pharmacies);
        assert_eq!(form.promo_code2, "EXTRA");
        assert!(form.remove_logo);

        let bad = Fields::parse("category=Кафе").unwrap();
        assert!(apply_place_fields(&mut form, &bad).is_err());
    }

    #[test]
    fn test_number_fields_format_phone() {
        let mut form = NumberForm::new("", OperatorKey::Mts);
        let fields = Fields::parse("phone=89991234567; operator=yota").unwrap();
        apply_number_fields(&mut form, &fields).unwrap();
        assert_eq!(form.phone, "+7 999 123 45 67");
        assert_eq!(form.operator_key, OperatorKey::Yota);
    }

    #[tokio::test]
    async fn test_console_answers_dialogs() {
        let input: &[u8] = b"y\nnope\nd\n";
        let console = Console::new(input, Vec::new());
        assert!(console.confirm("Удалить номер", "?").await);
        assert!(!console.confirm("Удалить номер", "?").await);
        assert_eq!(console.unsaved_choice().await, UnsavedChoice::Discard);
        // End of input cancels
        assert_eq!(console.unsaved_choice().await, UnsavedChoice::Cancel);
        let out = console.out.lock().await.clone();
        assert!(String::from_utf8(out).unwrap().contains("[y/n]"));
    }

    #[tokio::test]
    async fn test_run_navigates_and_exits() {
        let mut server = mockito::Server::new_async().await;
        let list = server
            .mock("GET", "/api/numbers")
            .with_status(200)
            .with_body(
                json!([{"id": uuid::Uuid::new_v4(), "phone": "+7 900 000 00 01", "operatorKey": "mts"}])
                    .to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let config =
            Config::from_json(&format!(r#"{{"api": {{"base_url": "{}"}}}}"#, server.url())).unwrap();
        let api = Arc::new(ApiClient::new(&config.api.base_url).unwrap());
        let mut shell = Shell::new(api, config);
        let input: &[u8] = b"numbers\nbogus\nexit\n";
        let console = Console::new(input, Vec::new());

        run(&mut shell, &console).await.unwrap();

        assert_eq!(shell.route(), Route::Numbers);
        let out = String::from_utf8(console.out.lock().await.clone()).unwrap();
        assert!(out.contains("+7 900 000 00 01"));
        assert!(out.contains("Unknown command: bogus"));
        list.assert_async().await;
    }

    #[tokio::test]
    async fn test_marked_row_is_saved_when_leaving() {
        let number_id = "5a0c6a0e-1f2b-4c3d-8e9f-0a1b2c3d4e5f";
        let place_id = "7f1c2f1e-8a51-4b0e-9b7b-2d0c7c1f0a11";
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", format!("/api/numbers/{}", number_id).as_str())
            .with_status(200)
            .with_body(
                json!({"id": number_id, "phone": "+7 900 000 00 01", "operatorKey": "mts"})
                    .to_string(),
            )
            .create_async()
            .await;
        server
            .mock("GET", format!("/api/numbers/{}/usage", number_id).as_str())
            .with_status(200)
            .with_body(
                json!({"used": [],
                       "unused": [{"id": place_id, "name": "Пятёрочка", "category": "Магазины"}]})
                .to_string(),
            )
            .create_async()
            .await;
        server
            .mock("GET", "/api/numbers")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;
        let post = server
            .mock("POST", "/api/usage")
            .match_body(mockito::Matcher::Json(
                json!({"numberId": number_id, "placeId": place_id, "used": true}),
            ))
            .with_status(200)
            .with_body(r#"{"ok": true}"#)
            .expect(1)
            .create_async()
            .await;

        let config =
            Config::from_json(&format!(r#"{{"api": {{"base_url": "{}"}}}}"#, server.url())).unwrap();
        let api = Arc::new(ApiClient::new(&config.api.base_url).unwrap());
        let mut shell = Shell::new(api, config);
        let script = format!("go /numbers/{}\nmark 1\ny\nnumbers\ns\nexit\n", number_id);
        let console = Console::new(script.as_bytes(), Vec::new());

        run(&mut shell, &console).await.unwrap();

        assert_eq!(shell.route(), Route::Numbers);
        let out = String::from_utf8(console.out.lock().await.clone()).unwrap();
        assert!(out.contains(" 1. [x] Пятёрочка"));
        assert!(out.contains("* есть несохранённые изменения"));
        assert!(out.contains("[s]ave"));
        post.assert_async().await;
    }
}

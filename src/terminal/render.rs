use crate::pages::settings::OperatorEntry;
use crate::pages::{
    NumberDetailPage, NumbersPage, PlaceDetailPage, PlacesPage, SearchPage, SettingsPage,
};
use crate::search::CreateOffer;
use crate::shell::{NavSection, Page, Shell};
use chrono::{DateTime, Utc};
use std::fmt::Write;

const UNSAVED_MARK: &str = "* есть несохранённые изменения\n";

fn when(at: Option<DateTime<Utc>>) -> String {
    at.map(|t| t.format("%d.%m.%Y %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn check(used: bool) -> &'static str {
    if used {
        "[x]"
    } else {
        "[ ]"
    }
}

pub fn nav_bar(current: NavSection) -> String {
    [NavSection::Search, NavSection::Numbers, NavSection::Places]
        .iter()
        .map(|s| {
            if *s == current {
                format!("<{}>", s.label())
            } else {
                s.label().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}

pub fn shell(shell: &Shell) -> String {
    let body = match shell.page() {
        Page::Search(p) => search(p),
        Page::Numbers(p) => numbers(p),
        Page::NumberDetail(p) => number_detail(p),
        Page::Places(p) => places(p),
        Page::PlaceDetail(p) => place_detail(p),
        Page::Settings(p) => settings(p),
    };
    format!("{}\n{}\n{}", shell.route(), body, nav_bar(shell.section()))
}

pub fn search(page: &SearchPage) -> String {
    let state = page.state();
    let mut out = format!("Поиск: {}\n", page.query());
    if state.query != page.query() {
        out.push_str("...\n");
        return out;
    }
    for (i, n) in state.result.numbers.iter().enumerate() {
        let _ = writeln!(out, "{:>2}. {}  {}", i + 1, n.phone, n.operator_key.display_name());
    }
    let offset = state.result.numbers.len();
    for (i, p) in state.result.places.iter().enumerate() {
        let _ = writeln!(out, "{:>2}. {}  ({})", offset + i + 1, p.name, p.category);
    }
    match &state.offer {
        Some(CreateOffer::Number { phone }) => {
            let _ = writeln!(out, "Ничего не найдено. submit: добавить номер {}", phone);
        }
        Some(CreateOffer::Place { name }) => {
            let _ = writeln!(out, "Ничего не найдено. submit: добавить место \"{}\"", name);
        }
        None => {}
    }
    out
}

pub fn numbers(page: &NumbersPage) -> String {
    let mut out = format!("Номера · {}\n", page.sort().label());
    for (i, n) in page.visible().iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>2}. {}  {}  использован {} раз",
            i + 1,
            n.phone,
            n.operator_key.display_name(),
            n.used_count
        );
    }
    out
}

pub fn places(page: &PlacesPage) -> String {
    let filter = page.filter();
    let category = filter
        .category
        .map(|c| c.label())
        .unwrap_or("Все категории");
    let mut out = format!("Места · {} · {}\n", category, filter.sort.label());
    for (i, p) in page.items().iter().enumerate() {
        let _ = writeln!(out, "{:>2}. {}  ({})  {}", i + 1, p.name, p.category, p.used_count);
    }
    out
}

pub fn number_detail(page: &NumberDetailPage) -> String {
    let (Some(number), Some(board)) = (page.number(), page.board()) else {
        return "Номер не найден\n".to_string();
    };
    let mut out = format!(
        "{}  {}\nПоследнее действие: {}\nИспользован в {} местах · {}\n",
        number.phone,
        number.operator_key.display_name(),
        when(page.last_action_at()),
        board.used_count(),
        page.sort().label()
    );
    if !board.has_any_usage() {
        out.push_str("Ещё нигде не использован\n");
    }
    if board.is_dirty() {
        out.push_str(UNSAVED_MARK);
    }
    for (i, p) in page.visible().iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>2}. {} {}  {}",
            i + 1,
            check(board.is_used(p.id)),
            p.name,
            when(p.used_at)
        );
    }
    out
}

pub fn place_detail(page: &PlaceDetailPage) -> String {
    let (Some(place), Some(board)) = (page.place(), page.board()) else {
        return "Место не найдено\n".to_string();
    };
    let mut out = format!(
        "{}  ({})\nПоследнее действие: {}\nНомеров использовано: {} · {}\n",
        place.name,
        place.category,
        when(page.last_action_at()),
        board.used_count(),
        page.sort().label()
    );
    if let Some(comment) = place.comment.as_deref().filter(|c| !c.is_empty()) {
        let _ = writeln!(out, "{}", comment);
    }
    if board.is_dirty() {
        out.push_str(UNSAVED_MARK);
    }
    for (i, n) in page.visible().iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>2}. {} {}  {}  {}",
            i + 1,
            check(board.is_used(n.id)),
            n.phone,
            n.operator_key.display_name(),
            when(n.used_at)
        );
    }
    out
}

pub fn promo(page: &PlaceDetailPage) -> String {
    match page.promo() {
        None => "Промокодов нет".to_string(),
        Some(promo) => {
            let mut out = String::new();
            if let Some(code) = promo.code {
                let _ = writeln!(out, "Промокод: {}", code);
            }
            if let Some(code) = promo.extra_code {
                let _ = writeln!(out, "Промокод 2: {}", code);
            }
            if let Some(url) = promo.url {
                let _ = writeln!(out, "Ссылка: {}", url);
            }
            out
        }
    }
}

pub fn settings(page: &SettingsPage) -> String {
    let mut out = "Настройки · операторы\n".to_string();
    for (i, OperatorEntry { id, name, logo }) in page.entries().iter().enumerate() {
        let editable = if id.is_some() { "" } else { " (встроенный)" };
        let _ = writeln!(
            out,
            "{:>2}. {}{}  {}",
            i + 1,
            name,
            editable,
            logo.as_deref().unwrap_or("")
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nav_bar_marks_current() {
        assert_eq!(nav_bar(NavSection::Numbers), "ПОИСК  <НОМЕРА>  МЕСТА");
    }

    #[test]
    fn test_when_formats_or_dashes() {
        let at = crate::api::types::timestamp::parse("2025-02-03T18:30:00");
        assert_eq!(when(at), "03.02.2025 18:30");
        assert_eq!(when(None), "-");
    }
}

use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Search,
    Numbers,
    NumberDetail(Uuid),
    Places,
    PlaceDetail(Uuid),
    Settings,
}

/// Bottom-nav tab highlighted for a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavSection {
    Search,
    Numbers,
    Places,
}

impl Route {
    /// Unknown paths and malformed ids fall back to the search page.
    pub fn parse(path: &str) -> Route {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            ["numbers"] => Route::Numbers,
            ["numbers", id] => Uuid::parse_str(id)
                .map(Route::NumberDetail)
                .unwrap_or(Route::Search),
            ["places"] => Route::Places,
            ["places", id] => Uuid::parse_str(id)
                .map(Route::PlaceDetail)
                .unwrap_or(Route::Search),
            ["settings"] => Route::Settings,
            _ => Route::Search,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Search => "/".to_string(),
            Route::Numbers => "/numbers".to_string(),
            Route::NumberDetail(id) => format!("/numbers/{}", id),
            Route::Places => "/places".to_string(),
            Route::PlaceDetail(id) => format!("/places/{}", id),
            Route::Settings => "/settings".to_string(),
        }
    }

    pub fn section(&self) -> NavSection {
        match self {
            Route::Numbers | Route::NumberDetail(_) => NavSection::Numbers,
            Route::Places | Route::PlaceDetail(_) => NavSection::Places,
            Route::Search | Route::Settings => NavSection::Search,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

impl NavSection {
    pub fn label(&self) -> &'static str {
        match self {
            NavSection::Search => "ПОИСК",
            NavSection::Numbers => "НОМЕРА",
            NavSection::Places => "МЕСТА",
        }
    }

    pub fn route(&self) -> Route {
        match self {
            NavSection::Search => Route::Search,
            NavSection::Numbers => Route::Numbers,
            NavSection::Places => Route::Places,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_paths() {
        let id = Uuid::new_v4();
        assert_eq!(Route::parse("/"), Route::Search);
        assert_eq!(Route::parse("/numbers"), Route::Numbers);
        assert_eq!(Route::parse("/numbers/"), Route::Numbers);
        assert_eq!(Route::parse(&format!("/numbers/{}", id)), Route::NumberDetail(id));
        assert_eq!(Route::parse(&format!("/places/{}?tab=used", id)), Route::PlaceDetail(id));
        assert_eq!(Route::parse("/settings"), Route::Settings);
        assert_eq!(Route::parse("/numbers/not-an-id"), Route::Search);
        assert_eq!(Route::parse("/unknown/path"), Route::Search);
    }

    #[test]
    fn test_path_round_trip_and_sections() {
        let id = Uuid::new_v4();
        for route in [
            Route::Search,
            Route::Numbers,
            Route::NumberDetail(id),
            Route::Places,
            Route::PlaceDetail(id),
            Route::Settings,
        ] {
            assert_eq!(Route::parse(&route.path()), route);
        }
        assert_eq!(Route::NumberDetail(id).section(), NavSection::Numbers);
        assert_eq!(Route::Settings.section(), NavSection::Search);
        assert_eq!(NavSection::Places.route(), Route::Places);
    }
}

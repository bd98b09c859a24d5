use std::borrow::Cow;

/// Client-side navigation surface: the documents screen at `/` and the chat
/// screen at `/chat/:collectionId`. The collection id is the only state that
/// crosses the screen boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Docs,
    Chat { collection_id: Option<String> },
}

impl Route {
    /// Parse a path. Anything that is not a known route falls back to `/`.
    pub fn parse(path: &str) -> Route {
        let path = path.trim();
        if let Some(rest) = path.strip_prefix("/chat") {
            let id = match rest.strip_prefix('/') {
                Some(id) => id,
                None if rest.is_empty() => "",
                None => return Route::Docs,
            };
            let id = urlencoding::decode(id)
                .map(Cow::into_owned)
                .unwrap_or_else(|_| id.to_string());
            return Route::Chat {
                collection_id: if id.is_empty() { None } else { Some(id) },
            };
        }
        Route::Docs
    }

    pub fn to_path(&self) -> String {
        match self {
            Route::Docs => "/".to_string(),
            Route::Chat {
                collection_id: None,
            } => "/chat".to_string(),
            Route::Chat {
                collection_id: Some(id),
            } => chat_path(id),
        }
    }
}

pub fn chat_path(collection_id: &str) -> String {
    format!("/chat/{}", urlencoding::encode(collection_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_and_unknown_paths_go_to_docs() {
        assert_eq!(Route::parse("/"), Route::Docs);
        assert_eq!(Route::parse(""), Route::Docs);
        assert_eq!(Route::parse("/settings"), Route::Docs);
        assert_eq!(Route::parse("/chatter"), Route::Docs);
    }

    #[test]
    fn chat_without_id_has_no_collection() {
        assert_eq!(
            Route::parse("/chat"),
            Route::Chat {
                collection_id: None
            }
        );
        assert_eq!(
            Route::parse("/chat/"),
            Route::Chat {
                collection_id: None
            }
        );
    }

    #[test]
    fn collection_id_round_trips_through_escaping() {
        for key in ["c42", "col 1", "a/b", "ünïcode"] {
            let route = Route::parse(&chat_path(key));
            assert_eq!(
                route,
                Route::Chat {
                    collection_id: Some(key.to_string())
                }
            );
            assert_eq!(Route::parse(&route.to_path()), route);
        }
    }
}

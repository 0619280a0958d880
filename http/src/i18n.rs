//! Locale catalogs and the middleware that attaches a [`Translation`] to
//! each request.
//!
//! Locale selection order: the `lang` query parameter, then each
//! `Accept-Language` entry (full tag, then primary subtag), then the
//! catalog's default locale.

use crate::error::CatalogError;
use basics_core::{HandlerFuture, Next, RawHandler, Request, Response, Translation, Translator};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Messages keyed by locale, then by message key.
#[derive(Debug, Clone)]
pub struct Catalog {
    default_locale: String,
    locales: HashMap<String, HashMap<String, String>>,
}

impl Catalog {
    pub fn new(default_locale: impl Into<String>) -> Self {
        Self {
            default_locale: default_locale.into(),
            locales: HashMap::new(),
        }
    }

    /// Add (or extend) a locale from `(key, message)` pairs.
    pub fn with_locale<I, K, V>(mut self, locale: impl Into<String>, messages: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = self.locales.entry(locale.into()).or_default();
        entries.extend(messages.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn insert(
        &mut self,
        locale: impl Into<String>,
        key: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.locales
            .entry(locale.into())
            .or_default()
            .insert(key.into(), message.into());
    }

    /// Load every `<locale>.json` file of `dir`, each a flat object of
    /// key to message.
    pub fn from_dir(
        dir: impl AsRef<Path>,
        default_locale: impl Into<String>,
    ) -> Result<Self, CatalogError> {
        let dir = dir.as_ref();
        let mut catalog = Self::new(default_locale);

        let entries = std::fs::read_dir(dir).map_err(|source| CatalogError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        for entry in entries {
            let path = entry
                .map_err(|source| CatalogError::Io {
                    path: dir.to_path_buf(),
                    source,
                })?
                .path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let Some(locale) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };

            let content = std::fs::read_to_string(&path).map_err(|source| CatalogError::Io {
                path: path.clone(),
                source,
            })?;
            let messages: HashMap<String, String> =
                serde_json::from_str(&content).map_err(|source| CatalogError::Json {
                    path: path.clone(),
                    source,
                })?;

            tracing::debug!(locale, count = messages.len(), "loaded locale");
            catalog = catalog.with_locale(locale.to_string(), messages);
        }

        Ok(catalog)
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    pub fn has_locale(&self, locale: &str) -> bool {
        self.locales.contains_key(locale)
    }

    /// Message for `key` in `locale`, falling back to the default locale and
    /// finally to the key itself.
    pub fn lookup<'a>(&'a self, locale: &str, key: &'a str) -> &'a str {
        self.locales
            .get(locale)
            .and_then(|messages| messages.get(key))
            .or_else(|| {
                self.locales
                    .get(&self.default_locale)
                    .and_then(|messages| messages.get(key))
            })
            .map(String::as_str)
            .unwrap_or(key)
    }

    /// First supported locale among the candidates.
    fn negotiate(&self, query: Option<&str>, accept_language: Option<&str>) -> String {
        if let Some(lang) = query.filter(|lang| self.has_locale(lang)) {
            return lang.to_string();
        }

        accept_language
            .into_iter()
            .flat_map(|header| header.split(','))
            .filter_map(|entry| entry.split(';').next())
            .map(str::trim)
            .filter(|tag| !tag.is_empty() && *tag != "*")
            .find_map(|tag| {
                if self.has_locale(tag) {
                    return Some(tag.to_string());
                }
                let primary = tag.split('-').next().unwrap_or(tag);
                self.has_locale(primary).then(|| primary.to_string())
            })
            .unwrap_or_else(|| self.default_locale.clone())
    }
}

/// Translator bound to one locale of a shared catalog.
///
/// Messages use positional placeholders: `%s` and `%d` consume the next
/// argument, `%%` is a literal percent sign. Placeholders without a matching
/// argument are left as written.
#[derive(Debug, Clone)]
pub struct LocaleTranslator {
    catalog: Arc<Catalog>,
    locale: String,
}

impl LocaleTranslator {
    pub fn new(catalog: Arc<Catalog>, locale: impl Into<String>) -> Self {
        Self {
            catalog,
            locale: locale.into(),
        }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }
}

impl Translator for LocaleTranslator {
    fn translate(&self, key: &str, args: &[String]) -> String {
        format_message(self.catalog.lookup(&self.locale, key), args)
    }
}

fn format_message(template: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut args = args.iter();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some('%') => {
                chars.next();
                out.push('%');
            }
            Some(kind @ ('s' | 'd')) => {
                chars.next();
                match args.next() {
                    Some(arg) => out.push_str(arg),
                    None => {
                        out.push('%');
                        out.push(kind);
                    }
                }
            }
            _ => out.push('%'),
        }
    }

    out
}

/// Raw middleware selecting the request locale and attaching its
/// [`Translation`].
#[derive(Debug, Clone)]
pub struct I18nMiddleware {
    catalog: Arc<Catalog>,
    query_key: String,
}

impl I18nMiddleware {
    pub fn new(catalog: Catalog) -> Self {
        Self::from_arc(Arc::new(catalog))
    }

    pub fn from_arc(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            query_key: "lang".to_string(),
        }
    }

    /// Query parameter consulted before `Accept-Language` (default `lang`).
    pub fn with_query_key(mut self, key: impl Into<String>) -> Self {
        self.query_key = key.into();
        self
    }

    fn locale_for(&self, request: &Request) -> String {
        let accept_language = request
            .header(http::header::ACCEPT_LANGUAGE.as_str())
            .and_then(|value| value.to_str().ok());
        self.catalog
            .negotiate(request.query_param(&self.query_key), accept_language)
    }
}

impl RawHandler for I18nMiddleware {
    fn call(&self, request: Request, _response: Response, next: Next) -> HandlerFuture {
        let locale = self.locale_for(&request);
        tracing::debug!(%locale, "selected locale");
        request.insert_extension(Translation::new(LocaleTranslator::new(
            self.catalog.clone(),
            locale,
        )));
        next.run()
    }
}

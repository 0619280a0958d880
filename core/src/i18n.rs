//! Translation shorthand.
//!
//! Translation itself is a collaborator: middleware attaches a
//! [`Translation`] to the request, and the context exposes it as [`I18n`]
//! when present.

use std::sync::Arc;

/// Collaborator resolving a key (plus positional format arguments) to text.
pub trait Translator: Send + Sync + 'static {
    fn translate(&self, key: &str, args: &[String]) -> String;
}

impl<F> Translator for F
where
    F: Fn(&str, &[String]) -> String + Send + Sync + 'static,
{
    fn translate(&self, key: &str, args: &[String]) -> String {
        self(key, args)
    }
}

/// Request extension carrying the translator selected for this request.
#[derive(Clone)]
pub struct Translation(Arc<dyn Translator>);

impl Translation {
    pub fn new(translator: impl Translator) -> Self {
        Self(Arc::new(translator))
    }

    pub fn from_arc(translator: Arc<dyn Translator>) -> Self {
        Self(translator)
    }
}

impl std::fmt::Debug for Translation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Translation").finish_non_exhaustive()
    }
}

/// One argument of [`I18n::tr`].
///
/// Sequences are spread as `(key, args...)`; an empty sequence is the empty
/// key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationKey {
    Key(String),
    Formatted { key: String, args: Vec<String> },
}

impl TranslationKey {
    fn from_sequence<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut parts = parts.into_iter().map(Into::into);
        let key = parts.next().unwrap_or_default();
        let args: Vec<String> = parts.collect();
        if args.is_empty() {
            Self::Key(key)
        } else {
            Self::Formatted { key, args }
        }
    }
}

impl From<&str> for TranslationKey {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for TranslationKey {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl<const N: usize> From<[&str; N]> for TranslationKey {
    fn from(parts: [&str; N]) -> Self {
        Self::from_sequence(parts)
    }
}

impl From<Vec<String>> for TranslationKey {
    fn from(parts: Vec<String>) -> Self {
        Self::from_sequence(parts)
    }
}

impl From<Vec<&str>> for TranslationKey {
    fn from(parts: Vec<&str>) -> Self {
        Self::from_sequence(parts)
    }
}

impl From<&[&str]> for TranslationKey {
    fn from(parts: &[&str]) -> Self {
        Self::from_sequence(parts.iter().copied())
    }
}

/// Result of [`I18n::tr`]: a single string for a single key, otherwise the
/// ordered list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translated {
    One(String),
    Many(Vec<String>),
}

impl Translated {
    pub fn as_one(&self) -> Option<&str> {
        match self {
            Self::One(text) => Some(text),
            Self::Many(_) => None,
        }
    }

    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(text) => vec![text],
            Self::Many(texts) => texts,
        }
    }
}

/// Translation helper exposed on `HttpBasics`.
#[derive(Clone, Debug)]
pub struct I18n {
    translation: Translation,
}

impl I18n {
    pub fn new(translation: Translation) -> Self {
        Self { translation }
    }

    /// Translate a single key.
    pub fn t(&self, key: impl Into<TranslationKey>) -> String {
        match key.into() {
            TranslationKey::Key(key) => self.translation.0.translate(&key, &[]),
            TranslationKey::Formatted { key, args } => self.translation.0.translate(&key, &args),
        }
    }

    /// Translate every key independently, in order.
    ///
    /// Exactly one key yields [`Translated::One`]; any other count, including
    /// two, yields [`Translated::Many`] with one entry per key.
    pub fn tr<I, K>(&self, keys: I) -> Translated
    where
        I: IntoIterator<Item = K>,
        K: Into<TranslationKey>,
    {
        let mut texts: Vec<String> = keys.into_iter().map(|key| self.t(key)).collect();
        if texts.len() == 1 {
            Translated::One(texts.remove(0))
        } else {
            Translated::Many(texts)
        }
    }
}

/// Variadic form of [`I18n::tr`].
///
/// ```
/// use basics_core::i18n::{I18n, Translated, Translation};
/// use basics_core::tr;
///
/// let i18n = I18n::new(Translation::new(|key: &str, args: &[String]| {
///     format!("{key}{}", args.concat())
/// }));
/// assert_eq!(tr!(i18n, "a"), Translated::One("a".into()));
/// assert_eq!(
///     tr!(i18n, "a", ["b", "!"]),
///     Translated::Many(vec!["a".into(), "b!".into()])
/// );
/// ```
#[macro_export]
macro_rules! tr {
    ($i18n:expr, $($key:expr),+ $(,)?) => {
        $i18n.tr([$($crate::i18n::TranslationKey::from($key)),+])
    };
}

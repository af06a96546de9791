//! Static synonym, typo-correction and popular-search tables.
//!
//! The built-in tables cover the storefront catalog (appliances, phones,
//! computers) and the services verticals (shipping, tours, car rental,
//! hotels, flights, visas) in Spanish and English. Config can extend or
//! replace them. Once built, a [`Dictionary`] is never mutated.

use std::collections::HashMap;

use crate::config::DictionaryConfig;
use crate::search::text::normalize_query;

const BUILTIN_SYNONYMS: &[(&str, &[&str])] = &[
    (
        "refrigerador",
        &["nevera", "heladera", "frigorifico", "refri", "fridge", "refrigerator"],
    ),
    ("lavadora", &["lavarropas", "washer", "washing machine"]),
    ("microondas", &["microwave", "horno microondas"]),
    ("estufa", &["cocina", "stove", "range"]),
    (
        "celular",
        &["telefono", "movil", "smartphone", "phone", "cellphone"],
    ),
    (
        "computadora",
        &["laptop", "portatil", "ordenador", "pc", "computer", "notebook"],
    ),
    ("televisor", &["tv", "television", "pantalla", "smart tv"]),
    (
        "audifonos",
        &["auriculares", "headphones", "cascos", "earbuds"],
    ),
    ("envio", &["shipping", "paqueteria", "courier", "delivery", "encomienda"]),
    ("tour", &["excursion", "paseo", "recorrido", "tours"]),
    ("auto", &["carro", "coche", "vehiculo", "car", "renta de autos", "car rental"]),
    ("hotel", &["hospedaje", "alojamiento", "hostal", "lodging"]),
    ("vuelo", &["boleto", "pasaje", "flight", "avion", "aerolinea"]),
    ("visa", &["visado", "pasaporte", "tramite", "visa americana"]),
];

const BUILTIN_CORRECTIONS: &[(&str, &str)] = &[
    ("refrijerador", "refrigerador"),
    ("refrigeradro", "refrigerador"),
    ("refirgerador", "refrigerador"),
    ("nebera", "nevera"),
    ("labadora", "lavadora"),
    ("lavdora", "lavadora"),
    ("microhondas", "microondas"),
    ("selular", "celular"),
    ("celualr", "celular"),
    ("computadroa", "computadora"),
    ("conputadora", "computadora"),
    ("labtop", "laptop"),
    ("televisro", "televisor"),
    ("telvisor", "televisor"),
    ("audifonso", "audifonos"),
    ("hotle", "hotel"),
    ("otel", "hotel"),
    ("vuleo", "vuelo"),
    ("bisa", "visa"),
    ("embio", "envio"),
];

const BUILTIN_POPULAR: &[&str] = &[
    "refrigerador",
    "celular",
    "laptop",
    "televisor",
    "audifonos",
    "envio a domicilio",
    "tours",
    "renta de autos",
    "hoteles",
    "vuelos",
    "visa americana",
];

/// A canonical concept and its interchangeable surface forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynonymGroup {
    pub key: String,
    pub synonyms: Vec<String>,
}

impl SynonymGroup {
    pub fn new(key: impl Into<String>, synonyms: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            key: key.into(),
            synonyms: synonyms.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `token` selects this group.
    ///
    /// A token selects a group when it equals the key, is one of the
    /// synonyms, or is a substring of the key (or the key of it).
    pub fn is_hit_by(&self, token: &str) -> bool {
        if token.is_empty() {
            return false;
        }
        token == self.key
            || self.synonyms.iter().any(|s| s == token)
            || self.key.contains(token)
            || token.contains(self.key.as_str())
    }

    /// The key followed by every synonym.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.key.as_str()).chain(self.synonyms.iter().map(String::as_str))
    }
}

/// Read-only expansion tables.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    groups: Vec<SynonymGroup>,
    corrections: HashMap<String, String>,
    popular: Vec<String>,
}

impl Dictionary {
    /// Build a dictionary from explicit tables. Entries are normalized.
    pub fn new(
        groups: Vec<SynonymGroup>,
        corrections: impl IntoIterator<Item = (String, String)>,
        popular: Vec<String>,
    ) -> Self {
        let mut dictionary = Self::default();
        for group in groups {
            dictionary.add_group(&group.key, group.synonyms);
        }
        for (typo, fix) in corrections {
            dictionary.add_correction(&typo, &fix);
        }
        for term in popular {
            dictionary.add_popular(&term);
        }
        dictionary
    }

    /// The built-in storefront dictionary.
    pub fn builtin() -> Self {
        let groups = BUILTIN_SYNONYMS
            .iter()
            .map(|(key, synonyms)| SynonymGroup::new(*key, synonyms.iter().copied()))
            .collect();
        let corrections = BUILTIN_CORRECTIONS
            .iter()
            .map(|(typo, fix)| (typo.to_string(), fix.to_string()));
        let popular = BUILTIN_POPULAR.iter().map(|s| s.to_string()).collect();
        Self::new(groups, corrections, popular)
    }

    /// The built-in dictionary layered with config entries.
    pub fn from_config(config: &DictionaryConfig) -> Self {
        let mut dictionary = if config.replace_builtin {
            Self::default()
        } else {
            Self::builtin()
        };

        for (key, synonyms) in &config.synonyms {
            dictionary.add_group(key, synonyms.iter().cloned());
        }
        for (typo, fix) in &config.corrections {
            dictionary.add_correction(typo, fix);
        }
        for term in &config.popular {
            dictionary.add_popular(term);
        }

        dictionary
    }

    fn add_group(&mut self, key: &str, synonyms: impl IntoIterator<Item = String>) {
        let key = normalize_query(key);
        if key.is_empty() {
            return;
        }
        let synonyms: Vec<String> = synonyms
            .into_iter()
            .map(|s| normalize_query(&s))
            .filter(|s| !s.is_empty() && *s != key)
            .collect();

        match self.groups.iter_mut().find(|g| g.key == key) {
            Some(group) => {
                for synonym in synonyms {
                    if !group.synonyms.contains(&synonym) {
                        group.synonyms.push(synonym);
                    }
                }
            }
            None => {
                let mut group = SynonymGroup::new(key, Vec::<String>::new());
                for synonym in synonyms {
                    if !group.synonyms.contains(&synonym) {
                        group.synonyms.push(synonym);
                    }
                }
                self.groups.push(group);
            }
        }
    }

    fn add_correction(&mut self, typo: &str, fix: &str) {
        let (typo, fix) = (normalize_query(typo), normalize_query(fix));
        if !typo.is_empty() && !fix.is_empty() {
            self.corrections.insert(typo, fix);
        }
    }

    fn add_popular(&mut self, term: &str) {
        let term = normalize_query(term);
        if !term.is_empty() && !self.popular.contains(&term) {
            self.popular.push(term);
        }
    }

    /// Synonym groups in dictionary order.
    pub fn groups(&self) -> &[SynonymGroup] {
        &self.groups
    }

    /// The correction for an exact misspelling.
    pub fn correction(&self, term: &str) -> Option<&str> {
        self.corrections.get(term).map(String::as_str)
    }

    /// Popular search terms in dictionary order.
    pub fn popular(&self) -> &[String] {
        &self.popular
    }
}

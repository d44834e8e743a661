use lol_data::AliasTable;
use std::collections::HashSet;

/// Labels the classifier emits when there is nothing sensible to report
const DENYLIST: [&str; 2] = ["hwei", "흐웨이"];

/// Maps raw recognizer labels onto the champion vocabulary
pub struct EntityResolver {
    vocabulary: HashSet<String>,
    aliases: AliasTable,
}

impl EntityResolver {
    pub fn new(vocabulary: impl IntoIterator<Item = String>, aliases: AliasTable) -> Self {
        Self {
            vocabulary: vocabulary.into_iter().collect(),
            aliases,
        }
    }

    pub fn is_denied(label: &str) -> bool {
        let norm = label.trim().to_lowercase();
        DENYLIST.contains(&norm.as_str())
    }

    pub fn in_vocabulary(&self, champion: &str) -> bool {
        self.vocabulary.contains(champion)
    }

    /// Canonical name for one label, `None` when denied or unknown
    pub fn canonical(&self, label: &str) -> Option<String> {
        let raw = label.trim();
        if raw.is_empty() || Self::is_denied(raw) {
            return None;
        }
        let translated = self.aliases.champion(raw);
        if Self::is_denied(translated) {
            return None;
        }
        self.in_vocabulary(translated).then(|| translated.to_string())
    }

    /// Translate, filter, de-duplicate (first seen wins) and cap
    pub fn resolve<'a>(
        &self,
        labels: impl IntoIterator<Item = &'a str>,
        cap: usize,
    ) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for label in labels {
            if out.len() >= cap {
                break;
            }
            if let Some(name) = self.canonical(label) {
                if seen.insert(name.clone()) {
                    out.push(name);
                }
            }
        }
        out
    }

    /// First vocabulary champion whose name occurs in OCR text, after the
    /// correction table. Raw text is kept when nothing matches.
    pub fn match_ocr_text(&self, text: &str) -> (String, bool) {
        let corrected = self.aliases.correct_ocr(text.trim());
        let mut names: Vec<&String> = self
            .vocabulary
            .iter()
            .filter(|name| corrected.contains(name.as_str()))
            .collect();
        // longest name first so "Nunu & Willump" beats "Nunu"; then alphabetical
        names.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
        match names.first() {
            Some(name) => ((*name).clone(), true),
            None => (corrected.to_string(), false),
        }
    }
}

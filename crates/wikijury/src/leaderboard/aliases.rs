use super::headers::normalize_header;
use std::collections::HashMap;
use std::sync::OnceLock;

pub(crate) const USERNAME: &str = "username";
pub(crate) const ENROLLMENT_TIMESTAMP: &str = "enrollment_timestamp";
pub(crate) const REVISIONS_DURING_PROJECT: &str = "revisions_during_project";
pub(crate) const TOTAL_EDITS: &str = "total_edits";
pub(crate) const MAINSPACE_BYTES_ADDED: &str = "mainspace_bytes_added";
pub(crate) const BYTES_ADDED: &str = "bytes_added";
pub(crate) const REFERENCES_ADDED: &str = "references_added";
pub(crate) const TOTAL_ARTICLES_CREATED: &str = "total_articles_created";
pub(crate) const ARTICLES_CREATED: &str = "articles_created";
pub(crate) const TOTAL_ARTICLES_EDITED: &str = "total_articles_edited";
pub(crate) const ARTICLES_EDITED: &str = "articles_edited";
pub(crate) const UPLOAD_COUNT: &str = "upload_count";
pub(crate) const WIKIDATA_SITE_EDITS: &str = "www.wikidata.org_edits";
pub(crate) const WIKIDATA_EDITS: &str = "wikidata_edits";
pub(crate) const CHARACTERS_ADDED: &str = "characters_added";
pub(crate) const EDIT_COUNT: &str = "edit_count";
pub(crate) const NEW_ARTICLE: &str = "new";
pub(crate) const USAGE_COUNT: &str = "usage_count";
pub(crate) const WIKI: &str = "wiki";

static HEADER_ALIAS_MAP: OnceLock<HashMap<String, &'static str>> = OnceLock::new();

/// Resolves a raw column header to the English source key it stands for.
///
/// Unknown headers keep their normalized spelling so wiki-specific columns
/// (`frwiki_edits`, ...) survive for overview passthrough.
pub(crate) fn source_key(raw_header: &str) -> String {
    let normalized = normalize_header(raw_header);
    match alias_for_normalized(&normalized) {
        Some(key) => key.to_string(),
        None => normalized,
    }
}

pub(crate) fn alias_for_normalized(normalized: &str) -> Option<&'static str> {
    header_alias_map().get(normalized).copied()
}

fn header_alias_map() -> &'static HashMap<String, &'static str> {
    HEADER_ALIAS_MAP.get_or_init(|| {
        const LABEL_TO_KEY: &[(&str, &str)] = &[
            // Identity
            ("username", USERNAME),
            ("user_name", USERNAME),
            ("user", USERNAME),
            ("Nom d'utilisateur", USERNAME),
            ("Utilisateur", USERNAME),
            ("Contributeur", USERNAME),
            ("enrollment_timestamp", ENROLLMENT_TIMESTAMP),
            ("Date d'inscription", ENROLLMENT_TIMESTAMP),
            // Editors export
            ("Modifications pendant le projet", REVISIONS_DURING_PROJECT),
            ("Total modifications", TOTAL_EDITS),
            ("Total éditions", TOTAL_EDITS),
            ("Octets ajoutés (espace principal)", MAINSPACE_BYTES_ADDED),
            ("Octets ajoutés", BYTES_ADDED),
            ("Références ajoutées", REFERENCES_ADDED),
            ("Total articles créés", TOTAL_ARTICLES_CREATED),
            ("Articles créés", ARTICLES_CREATED),
            ("Total articles modifiés", TOTAL_ARTICLES_EDITED),
            ("Articles modifiés", ARTICLES_EDITED),
            // Uploads and Wikidata
            ("Fichiers téléversés", UPLOAD_COUNT),
            ("Images ajoutées", UPLOAD_COUNT),
            ("Éditions Wikidata", WIKIDATA_SITE_EDITS),
            ("Éléments Wikidata", WIKIDATA_SITE_EDITS),
            ("Nombre d'utilisations", USAGE_COUNT),
            // Per-article export
            ("Caractères ajoutés", CHARACTERS_ADDED),
            ("Nombre de modifications", EDIT_COUNT),
            ("Nouvel article", NEW_ARTICLE),
            // Overview export
            ("Wiki", WIKI),
            ("Projet", WIKI),
            ("project", WIKI),
        ];

        let mut map = HashMap::with_capacity(LABEL_TO_KEY.len());
        for (label, key) in LABEL_TO_KEY {
            map.insert(normalize_header(label), *key);
        }
        map
    })
}

//! Dictionary-backed lemmatizer for English and Spanish tokens.
//!
//! Irregular forms are looked up first; everything else goes through a
//! small set of conservative inflection rules that only strip plural and
//! third-person endings. Input is expected to be lowercase.

use std::collections::HashMap;
use std::sync::OnceLock;

const IRREGULAR: &[(&str, &str)] = &[
    // English
    ("children", "child"),
    ("men", "man"),
    ("women", "woman"),
    ("mice", "mouse"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("geese", "goose"),
    ("lives", "life"),
    ("wives", "wife"),
    ("knives", "knife"),
    ("leaves", "leaf"),
    ("news", "news"),
    ("series", "series"),
    ("species", "species"),
    ("always", "always"),
    ("has", "have"),
    ("had", "have"),
    ("did", "do"),
    ("went", "go"),
    ("made", "make"),
    ("took", "take"),
    ("gave", "give"),
    ("found", "find"),
    ("told", "tell"),
    ("thought", "think"),
    ("became", "become"),
    ("came", "come"),
    ("saw", "see"),
    ("known", "know"),
    ("shown", "show"),
    ("better", "good"),
    ("worse", "bad"),
    // Spanish
    ("fue", "ser"),
    ("era", "ser"),
    ("es", "ser"),
    ("son", "ser"),
    ("hay", "haber"),
    ("tiene", "tener"),
    ("tienen", "tener"),
    ("dijo", "decir"),
    ("hizo", "hacer"),
    ("puede", "poder"),
    ("pueden", "poder"),
    ("días", "día"),
    ("países", "país"),
    ("meses", "mes"),
    ("veces", "vez"),
    ("luces", "luz"),
    ("leyes", "ley"),
    ("mujeres", "mujer"),
    ("hospitales", "hospital"),
    ("millones", "millón"),
    ("virus", "virus"),
    ("crisis", "crisis"),
];

fn irregular() -> &'static HashMap<&'static str, &'static str> {
    static TABLE: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    TABLE.get_or_init(|| IRREGULAR.iter().copied().collect())
}

/// Reduce a lowercase token to its base form.
pub fn lemmatize(token: &str) -> String {
    if let Some(base) = irregular().get(token) {
        return (*base).to_string();
    }

    let len = token.chars().count();
    if len < 4 {
        return token.to_string();
    }

    // Spanish -ción/-sión plurals
    if let Some(stem) = token.strip_suffix("iones") {
        return format!("{}ión", stem);
    }

    // Spanish -dad plurals (ciudades, enfermedades)
    if let Some(stem) = token.strip_suffix("dades") {
        return format!("{}dad", stem);
    }

    if len > 4 {
        if let Some(stem) = token.strip_suffix("ies") {
            return format!("{}y", stem);
        }
    }

    for suffix in ["sses", "xes", "ches", "shes"] {
        if token.ends_with(suffix) {
            return token[..token.len() - 2].to_string();
        }
    }

    if token.ends_with('s') && !token.ends_with("ss") && !token.ends_with("us") && !token.ends_with("is") {
        return token[..token.len() - 1].to_string();
    }

    token.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_plurals() {
        assert_eq!(lemmatize("vaccines"), "vaccine");
        assert_eq!(lemmatize("vacunas"), "vacuna");
        assert_eq!(lemmatize("médicos"), "médico");
    }

    #[test]
    fn test_suffix_rules() {
        assert_eq!(lemmatize("studies"), "study");
        assert_eq!(lemmatize("classes"), "class");
        assert_eq!(lemmatize("churches"), "church");
        assert_eq!(lemmatize("infecciones"), "infección");
        assert_eq!(lemmatize("enfermedades"), "enfermedad");
    }

    #[test]
    fn test_irregular_forms() {
        assert_eq!(lemmatize("children"), "child");
        assert_eq!(lemmatize("días"), "día");
        assert_eq!(lemmatize("news"), "news");
    }

    #[test]
    fn test_protected_endings_are_kept() {
        assert_eq!(lemmatize("analysis"), "analysis");
        assert_eq!(lemmatize("status"), "status");
        assert_eq!(lemmatize("glass"), "glass");
        assert_eq!(lemmatize("gas"), "gas");
    }

    #[test]
    fn test_lemmas_are_stable() {
        for word in ["vaccines", "studies", "infecciones", "classes", "children", "ciudades"] {
            let once = lemmatize(word);
            assert_eq!(lemmatize(&once), once, "{} is not stable", word);
        }
    }
}

use std::path::Path;

use tracing::trace;

use crate::rules::{CompiledPass, RuleFile, RulesError};

/// Maps a free-text job title to the key it is clustered under.
///
/// The key is lower-case, has parenthesized qualifiers and seniority words
/// removed, and folds related technologies into broad buckets (`developer`,
/// `cloud`, `data`, `security`). An empty key is valid.
#[derive(Debug, Clone)]
pub struct TitleNormalizer {
    passes: Vec<CompiledPass>,
}

impl TitleNormalizer {
    pub fn new(rules: &RuleFile) -> Result<Self, RulesError> {
        let passes = rules
            .passes
            .iter()
            .map(CompiledPass::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { passes })
    }

    pub fn builtin() -> Result<Self, RulesError> {
        Self::new(&RuleFile::builtin()?)
    }

    pub fn from_yaml(text: &str) -> Result<Self, RulesError> {
        Self::new(&RuleFile::from_yaml(text)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RulesError> {
        Self::new(&RuleFile::from_path(path)?)
    }

    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    pub fn normalize(&self, title: &str) -> String {
        let mut key = title.to_lowercase();
        for pass in &self.passes {
            key = pass.apply(&key);
            trace!(pass = pass.name(), %key, "rewrite pass applied");
        }
        collapse_whitespace(&key)
    }
}

fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::title_case;

    fn normalizer() -> TitleNormalizer {
        TitleNormalizer::builtin().expect("builtin rules")
    }

    #[test]
    fn seniority_and_parenthesized_qualifiers_are_dropped() {
        let n = normalizer();
        assert_eq!(n.normalize("Senior Python Developer"), "python");
        assert_eq!(n.normalize("Python Developer (Junior)"), "python");
        assert_eq!(n.normalize("Python Engineer"), "python");
        assert_eq!(n.normalize("Sénior Java Engineer (m/f)"), "java");
    }

    #[test]
    fn families_collapse_into_buckets() {
        let n = normalizer();
        assert_eq!(n.normalize("Data Engineer"), "data");
        assert_eq!(n.normalize("Backend Developer"), "developer");
        assert_eq!(n.normalize("Frontend React Developer"), "developer react");
        assert_eq!(n.normalize("Web Developer"), "web");
        assert_eq!(n.normalize("AWS DevOps Engineer"), "cloud cloud");
        assert_eq!(n.normalize("Big Data / Spark Specialist"), "data / data");
        assert_eq!(n.normalize("Cybersecurity Analyst"), "security");
        assert_eq!(n.normalize("BI Consultant"), "data");
    }

    #[test]
    fn filler_words_and_spacing_are_cleaned() {
        let n = normalizer();
        assert_eq!(n.normalize("  IT   Support Technician  "), "it support");
        assert_eq!(n.normalize("Solutions Staff"), "");
        assert_eq!(n.normalize("Team Lead"), "");
    }

    #[test]
    fn normalization_ignores_case() {
        let n = normalizer();
        for title in [
            "Senior Python Developer",
            "Sénior .NET Developer (Lisboa)",
            "Big Data Engineer",
            "Frontend React Developer",
            "QA Tester",
        ] {
            assert_eq!(n.normalize(title), n.normalize(&title.to_uppercase()), "{title}");
        }
    }

    #[test]
    fn normalization_is_idempotent_through_display_form() {
        let n = normalizer();
        for title in [
            "Senior Python Developer",
            "Python Developer (Junior)",
            "Data Engineer",
            "Azure Cloud Architect",
            "Mobile Developer iOS/Android",
            "Salesforce Consultant",
            "Project Manager",
            "Machine Learning Engineer",
            "Sénior .NET Developer",
            "IT QA Automation",
        ] {
            let key = n.normalize(title);
            assert_eq!(n.normalize(&title_case(&key)), key, "{title}");
        }
    }

    #[test]
    fn developer_bucket_is_not_a_fixed_point() {
        // "developer" is both a removed role word and the bucket name.
        let n = normalizer();
        let key = n.normalize("Full-Stack Developer");
        assert_eq!(key, "developer");
        assert_eq!(n.normalize(&title_case(&key)), "");
    }

    #[test]
    fn custom_vocabulary_replaces_builtin() {
        let n = TitleNormalizer::from_yaml(
            "version: 1\npasses:\n  - name: rust\n    kind: words\n    words: [rustacean]\n    replace: rust\n",
        )
        .expect("rules");
        assert_eq!(n.pass_count(), 1);
        assert_eq!(n.normalize("Senior Rustacean"), "senior rust");
    }
}

//! Extraction categories and their prompt templates.
//!
//! Each category carries a built-in Tera template that renders the full
//! instruction payload with the document text bound to `{{ text }}`.
//! Built-ins may be overridden per category from a template directory.

use crate::error::{Error, Result};
use std::path::Path;
use tera::{Context, Tera};

/// One of the four independent extraction targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Contact details, education, latest position
    BasicInfo,
    /// Spoken/written languages with proficiency codes
    Languages,
    /// Areas of expertise
    Specialties,
    /// Flat skills list
    Skills,
}

impl Category {
    /// Returns the ID string for this category.
    ///
    /// The ID doubles as the record attribute name and the template name.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::BasicInfo => "basic_info",
            Self::Languages => "languages",
            Self::Specialties => "specialties",
            Self::Skills => "skills",
        }
    }

    /// Returns the key extracted from the model response, if any.
    ///
    /// The basic_info response is stored whole; the list categories pull a
    /// single named key out of the response object.
    #[must_use]
    pub const fn key(self) -> Option<&'static str> {
        match self {
            Self::BasicInfo => None,
            Self::Languages => Some("languages"),
            Self::Specialties => Some("specialties"),
            Self::Skills => Some("skills"),
        }
    }

    /// Returns all categories in extraction order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::BasicInfo,
            Self::Languages,
            Self::Specialties,
            Self::Skills,
        ]
    }

    /// Parse a category from its string ID.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "basic_info" => Some(Self::BasicInfo),
            "languages" => Some(Self::Languages),
            "specialties" => Some(Self::Specialties),
            "skills" => Some(Self::Skills),
            _ => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Prompt template registry for the four categories.
pub struct PromptLibrary {
    tera: Tera,
}

impl PromptLibrary {
    /// Creates a library with the built-in templates, applying per-category
    /// overrides from `template_dir` when a `<category>.tera` file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if template registration fails or an override does
    /// not reference the `text` variable.
    pub fn new(template_dir: Option<&Path>) -> Result<Self> {
        let mut tera = Tera::default();

        Self::register_builtin_templates(&mut tera)?;

        if let Some(dir) = template_dir {
            Self::register_overrides(&mut tera, dir)?;
        }

        Ok(Self { tera })
    }

    /// Registers the built-in template for each category.
    fn register_builtin_templates(tera: &mut Tera) -> Result<()> {
        tera.add_raw_template(
            Category::BasicInfo.id(),
            include_str!("../templates/basic_info.tera"),
        )
        .map_err(|e| Error::template(Category::BasicInfo.id(), e.to_string()))?;

        tera.add_raw_template(
            Category::Languages.id(),
            include_str!("../templates/languages.tera"),
        )
        .map_err(|e| Error::template(Category::Languages.id(), e.to_string()))?;

        tera.add_raw_template(
            Category::Specialties.id(),
            include_str!("../templates/specialties.tera"),
        )
        .map_err(|e| Error::template(Category::Specialties.id(), e.to_string()))?;

        tera.add_raw_template(
            Category::Skills.id(),
            include_str!("../templates/skills.tera"),
        )
        .map_err(|e| Error::template(Category::Skills.id(), e.to_string()))?;

        Ok(())
    }

    /// Loads `<category>.tera` override files; categories without an
    /// override keep the built-in.
    fn register_overrides(tera: &mut Tera, dir: &Path) -> Result<()> {
        for &category in Category::all() {
            let path = dir.join(format!("{}.tera", category.id()));
            if !path.is_file() {
                continue;
            }

            let source = std::fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;

            if !references_text(&source) {
                return Err(Error::template(
                    category.id(),
                    format!(
                        "override '{}' must reference the {{{{ text }}}} variable",
                        path.display()
                    ),
                ));
            }

            tera.add_raw_template(category.id(), &source)
                .map_err(|e| Error::template(category.id(), e.to_string()))?;

            tracing::debug!("Using template override for {}: {}", category, path.display());
        }

        Ok(())
    }

    /// Renders the instruction payload for a category.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn render(&self, category: Category, text: &str) -> Result<String> {
        let mut context = Context::new();
        context.insert("text", text);

        self.tera
            .render(category.id(), &context)
            .map_err(|e| Error::template(category.id(), e.to_string()))
    }
}

/// Checks that a template source uses the `text` variable.
fn references_text(source: &str) -> bool {
    source
        .match_indices("{{")
        .any(|(i, _)| source[i + 2..].trim_start().starts_with("text"))
}

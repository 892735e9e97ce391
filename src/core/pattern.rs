//! Filename classification for generated image variants
//!
//! A filename is either a size variant (`photo-300x200.jpg`), a derived parent
//! (`photo-scaled.jpg`, `photo-e1700000000000.jpg`) or unclassified. Rules are
//! tried in table order and the first match wins, so more specific marker
//! combinations must come before the looser ones they contain.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Dimension tag carried by parent variants
pub const PARENT_TAG: &str = "parent";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum VariantKind {
	/// Fixed-size derivative, `-WxH`
	SizeVariant,
	/// Scaled or edited intermediate, `-scaled` / `-e<timestamp>`
	ParentVariant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantMatch {
	pub base_name: String,
	/// Extension with its leading dot, possibly compound (`.jpg.webp`)
	pub extension: String,
	/// `WxH` for size variants, `parent` for parent variants
	pub dimension_tag: String,
	pub kind: VariantKind,
	/// Name of the rule that matched
	pub rule: &'static str,
}

impl VariantMatch {
	/// `.webp` copy layered over another image extension
	pub fn is_webp_copy(&self) -> bool {
		self.source_extension().is_some()
	}

	/// For `.jpg.webp` returns `.jpg`
	pub fn source_extension(&self) -> Option<&str> {
		let lower = self.extension.to_ascii_lowercase();
		if !lower.ends_with(".webp") || lower.matches('.').count() < 2 {
			return None;
		}
		Some(&self.extension[..self.extension.len() - ".webp".len()])
	}

	/// `base_name + extension`, the file this variant reduces to
	pub fn base_filename(&self) -> String {
		format!("{}{}", self.base_name, self.extension)
	}
}

#[derive(Debug, Clone, Copy)]
enum ExtForm {
	WebpCopy,
	Plain,
}

impl ExtForm {
	fn pattern(self) -> &'static str {
		match self {
			ExtForm::WebpCopy => r"(?P<ext>\.(?i:jpe?g|png|gif)\.(?i:webp))",
			ExtForm::Plain => r"(?P<ext>\.(?i:jpe?g|png|gif|webp))",
		}
	}
}

const SCALED_EDITED_SIZE: &str = r"-scaled-e\d{13}-(?P<dim>\d+x\d+)";
const SCALED_SIZE: &str = r"-scaled-(?P<dim>\d+x\d+)";
const EDITED_SIZE: &str = r"-e\d{13}-(?P<dim>\d+x\d+)";
const SIZE: &str = r"-(?P<dim>\d+x\d+)";
const SCALED_EDITED: &str = r"-scaled-e\d{13}";
const SCALED: &str = r"-scaled";
const EDITED: &str = r"-e\d{13}";

use VariantKind::{ParentVariant, SizeVariant};

/// Most specific first. Size rules precede parent rules.
const RULE_TABLE: &[(&str, VariantKind, &str, ExtForm)] = &[
	("scaled-edited-size-webp", SizeVariant, SCALED_EDITED_SIZE, ExtForm::WebpCopy),
	("scaled-edited-size", SizeVariant, SCALED_EDITED_SIZE, ExtForm::Plain),
	("scaled-size-webp", SizeVariant, SCALED_SIZE, ExtForm::WebpCopy),
	("scaled-size", SizeVariant, SCALED_SIZE, ExtForm::Plain),
	("edited-size-webp", SizeVariant, EDITED_SIZE, ExtForm::WebpCopy),
	("edited-size", SizeVariant, EDITED_SIZE, ExtForm::Plain),
	("size-webp", SizeVariant, SIZE, ExtForm::WebpCopy),
	("size", SizeVariant, SIZE, ExtForm::Plain),
	("scaled-edited-webp", ParentVariant, SCALED_EDITED, ExtForm::WebpCopy),
	("scaled-edited", ParentVariant, SCALED_EDITED, ExtForm::Plain),
	("scaled-webp", ParentVariant, SCALED, ExtForm::WebpCopy),
	("scaled", ParentVariant, SCALED, ExtForm::Plain),
	("edited-webp", ParentVariant, EDITED, ExtForm::WebpCopy),
	("edited", ParentVariant, EDITED, ExtForm::Plain),
];

struct Rule {
	name: &'static str,
	kind: VariantKind,
	pattern: Regex,
}

impl Rule {
	fn compile(name: &'static str, kind: VariantKind, marker: &str, ext: ExtForm) -> Self {
		let source = format!(r"^(?P<base>.+?){}{}$", marker, ext.pattern());
		// Table entries are constants; a bad one is a programming error
		let pattern = Regex::new(&source).unwrap_or_else(|e| panic!("rule '{}': {}", name, e));
		Self { name, kind, pattern }
	}

	fn apply(&self, filename: &str) -> Option<VariantMatch> {
		let caps = self.pattern.captures(filename)?;
		let dimension_tag = match self.kind {
			SizeVariant => caps.name("dim")?.as_str().to_string(),
			ParentVariant => PARENT_TAG.to_string(),
		};

		Some(VariantMatch {
			base_name: caps["base"].to_string(),
			extension: caps["ext"].to_string(),
			dimension_tag,
			kind: self.kind,
			rule: self.name,
		})
	}
}

fn rules() -> &'static [Rule] {
	static RULES: OnceLock<Vec<Rule>> = OnceLock::new();
	RULES.get_or_init(|| {
		RULE_TABLE
			.iter()
			.map(|&(name, kind, marker, ext)| Rule::compile(name, kind, marker, ext))
			.collect()
	})
}

/// Rule names in evaluation order
pub fn rule_names() -> Vec<&'static str> {
	rules().iter().map(|r| r.name).collect()
}

fn first_match(filename: &str) -> Option<VariantMatch> {
	rules().iter().find_map(|rule| rule.apply(filename))
}

/// Classify a filename; `None` means a plain (parent candidate) file.
///
/// The extracted base never classifies again: stacked markers such as
/// `photo-300x200-150x150.jpg` are stripped down to `photo`, keeping the
/// dimension tag of the outermost match.
pub fn classify(filename: &str) -> Option<VariantMatch> {
	let mut found = first_match(filename)?;
	while let Some(inner) = first_match(&found.base_filename()) {
		found.base_name = inner.base_name;
	}
	Some(found)
}

pub fn is_unclassified(filename: &str) -> bool {
	first_match(filename).is_none()
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;
	use proptest::prelude::*;

	fn parts(filename: &str) -> (String, String, String, VariantKind) {
		let m = classify(filename).unwrap_or_else(|| panic!("{} should classify", filename));
		(m.base_name, m.extension, m.dimension_tag, m.kind)
	}

	#[test]
	fn plain_size_variant() {
		assert_eq!(
			parts("photo-300x200.jpg"),
			("photo".into(), ".jpg".into(), "300x200".into(), SizeVariant)
		);
	}

	#[test]
	fn webp_copy_keeps_compound_extension() {
		let m = classify("photo-300x200.jpg.webp").unwrap();
		assert_eq!(m.base_name, "photo");
		assert_eq!(m.extension, ".jpg.webp");
		assert_eq!(m.rule, "size-webp");
		assert!(m.is_webp_copy());
		assert_eq!(m.source_extension(), Some(".jpg"));
	}

	#[test]
	fn bare_webp_is_not_a_copy() {
		let m = classify("photo-300x200.webp").unwrap();
		assert_eq!(m.extension, ".webp");
		assert!(!m.is_webp_copy());
	}

	#[test]
	fn scaled_and_edited_markers_are_stripped() {
		assert_eq!(parts("photo-scaled-300x200.jpg").0, "photo");
		assert_eq!(parts("photo-e1700000000000-300x200.png").0, "photo");
		assert_eq!(parts("photo-scaled-e1700000000000-1024x768.jpeg.webp").0, "photo");
	}

	#[test]
	fn parent_variants_are_tagged_parent() {
		assert_eq!(
			parts("photo-scaled.jpg"),
			("photo".into(), ".jpg".into(), PARENT_TAG.into(), ParentVariant)
		);
		assert_eq!(parts("photo-e1700000000000.gif").3, ParentVariant);
		assert_eq!(parts("photo-scaled-e1700000000000.jpg.webp").1, ".jpg.webp");
	}

	#[test]
	fn most_specific_rule_wins() {
		assert_eq!(classify("a-scaled-e1700000000000-10x10.jpg.webp").unwrap().rule, "scaled-edited-size-webp");
		assert_eq!(classify("a-scaled-e1700000000000-10x10.jpg").unwrap().rule, "scaled-edited-size");
		assert_eq!(classify("a-scaled-10x10.jpg").unwrap().rule, "scaled-size");
		assert_eq!(classify("a-e1700000000000-10x10.jpg").unwrap().rule, "edited-size");
		assert_eq!(classify("a-scaled-e1700000000000.jpg").unwrap().rule, "scaled-edited");
		assert_eq!(classify("a-e1700000000000.jpg").unwrap().rule, "edited");
	}

	#[test]
	fn rule_order_is_most_specific_first() {
		let names = rule_names();
		let pos = |n: &str| names.iter().position(|x| *x == n).unwrap();

		assert!(pos("scaled-edited-size-webp") < pos("scaled-size-webp"));
		assert!(pos("scaled-size") < pos("edited-size"));
		assert!(pos("edited-size") < pos("size"));
		assert!(pos("size") < pos("scaled-edited"));
		assert!(pos("scaled-edited") < pos("scaled"));
		assert!(pos("scaled") < pos("edited"));
		for pair in names.chunks(2) {
			assert_eq!(format!("{}-webp", pair[1]), pair[0]);
		}
	}

	#[test]
	fn originals_are_unclassified() {
		for name in ["photo.jpg", "photo.jpg.webp", "IMG_2041.PNG", "logo-dark.svg", "scaled.jpg", "-300x200.jpg"] {
			assert!(classify(name).is_none(), "{} should not classify", name);
		}
	}

	#[test]
	fn edit_stamp_needs_thirteen_digits() {
		assert!(classify("photo-e12345.jpg").is_none());
		assert!(classify("photo-e1234567890123.jpg").is_some());
	}

	#[test]
	fn extension_case_is_preserved() {
		let m = classify("Photo-300x200.JPG").unwrap();
		assert_eq!(m.extension, ".JPG");
	}

	#[test]
	fn stacked_size_markers_reduce_to_original() {
		let m = classify("photo-300x200-150x150.jpg").unwrap();
		assert_eq!(m.base_name, "photo");
		assert_eq!(m.dimension_tag, "150x150");
	}

	fn filename() -> impl Strategy<Value = String> {
		let base = "[A-Za-z0-9_][A-Za-z0-9_.-]{0,12}";
		let marker = prop_oneof![
			Just(String::new()),
			Just("-scaled".to_string()),
			"-e[0-9]{13}",
			"-[0-9]{1,4}x[0-9]{1,4}",
			"-scaled-[0-9]{1,4}x[0-9]{1,4}",
			"-e[0-9]{13}-[0-9]{1,4}x[0-9]{1,4}",
		];
		let ext = prop_oneof![
			Just(".jpg"), Just(".jpeg"), Just(".png"), Just(".gif"), Just(".webp"),
			Just(".jpg.webp"), Just(".PNG.webp"),
		];
		(base, marker, marker_tail(), ext).prop_map(|(b, m, t, e)| format!("{}{}{}{}", b, m, t, e))
	}

	fn marker_tail() -> impl Strategy<Value = String> {
		prop_oneof![Just(String::new()), "-[0-9]{1,3}x[0-9]{1,3}"]
	}

	proptest! {
		#[test]
		fn base_extraction_is_idempotent(name in filename()) {
			if let Some(m) = classify(&name) {
				prop_assert!(classify(&m.base_filename()).is_none(), "{} -> {}", name, m.base_filename());
			}
		}

		#[test]
		fn arbitrary_names_never_panic(name in "\\PC{0,40}") {
			if let Some(m) = classify(&name) {
				prop_assert!(is_unclassified(&m.base_filename()));
			}
		}
	}
}

//! Scenario structure extraction from test source text
//!
//! Recognizes `describe('label', ...)` sections and `it('label')` /
//! `test('label')` cases lexically. Nothing is evaluated: labels are taken
//! verbatim from the source, escapes included.

use regex::{Captures, Regex};
use std::sync::LazyLock;

use super::scanner::{find_block_open, find_matching_close, in_skipped, skipped_ranges};
use super::types::ScenarioSection;

/// A single-, double- or backtick-quoted label; one capture group per quote style
const QUOTED_LABEL: &str = r#"(?:'((?:[^'\\]|\\.)*)'|"((?:[^"\\]|\\.)*)"|`((?:[^`\\]|\\.)*)`)"#;

static SECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?s)\bdescribe(?:\.(?:only|skip|concurrent|sequential))?\s*\(\s*{QUOTED_LABEL}"
    ))
    .expect("section pattern is valid")
});

static LEAF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?s)\b(?:it|test)(?:\.(?:only|skip|todo|concurrent|fails))?\s*\(\s*{QUOTED_LABEL}"
    ))
    .expect("leaf pattern is valid")
});

static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?m)(?:^|;)\s*(?:import\s*['"]([^'"\n]+)['"]|(?:import|export)\s[^;()=]*?\bfrom\s*['"]([^'"\n]+)['"])"#,
    )
    .expect("import pattern is valid")
});

/// Everything mined from one test file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MinedSource {
    pub sections: Vec<ScenarioSection>,
    pub imports: Vec<String>,
}

/// Mine sections and import paths from test source text
pub fn mine_source(source: &str) -> MinedSource {
    MinedSource {
        sections: extract_sections(source),
        imports: extract_imports(source),
    }
}

/// Extract the top-level sections of a test file, in source order
///
/// Cases of nested sections belong to their enclosing top-level section.
/// Sections without cases are kept; aggregation drops them later.
pub fn extract_sections(source: &str) -> Vec<ScenarioSection> {
    let mut sections = Vec::new();
    let skipped = skipped_ranges(source);
    let mut pos = 0;

    while let Some(caps) = SECTION_RE.captures_at(source, pos) {
        let whole = caps.get(0).map_or(pos..source.len(), |m| m.range());
        if in_skipped(&skipped, whole.start) {
            pos = whole.end;
            continue;
        }
        let mut section = ScenarioSection::new(label(&caps));

        // The call's own parenthesis bounds where the callback body may start
        let paren = source[whole.clone()].find('(').map(|off| whole.start + off);
        let call_end = paren.and_then(|p| find_matching_close(source, p));

        let open = find_block_open(source, whole.end)
            .filter(|&open| call_end.map_or(true, |end| open < end));

        let Some(open) = open else {
            tracing::debug!(section = %section.name, "Section has no body");
            sections.push(section);
            pos = call_end.map_or(whole.end, |end| end + 1);
            continue;
        };

        let close = find_matching_close(source, open);
        let body_start = open + 1;
        let body = &source[body_start..close.unwrap_or(source.len())];
        for leaf in LEAF_RE.captures_iter(body) {
            let commented = leaf
                .get(0)
                .is_some_and(|m| in_skipped(&skipped, body_start + m.start()));
            if !commented {
                section.insert(label(&leaf));
            }
        }

        tracing::debug!(
            section = %section.name,
            scenarios = section.scenarios.len(),
            terminated = close.is_some(),
            "Extracted section"
        );
        sections.push(section);

        match close {
            Some(close) => pos = close + 1,
            None => break,
        }
    }

    sections
}

/// Extract dependency strings of `import`/`export ... from` statements
///
/// Order follows the source; repeated dependencies are reported once.
pub fn extract_imports(source: &str) -> Vec<String> {
    let mut imports: Vec<String> = Vec::new();
    for caps in IMPORT_RE.captures_iter(source) {
        let Some(dep) = caps.get(1).or_else(|| caps.get(2)) else {
            continue;
        };
        if !imports.iter().any(|existing| existing == dep.as_str()) {
            imports.push(dep.as_str().to_string());
        }
    }
    imports
}

/// The captured label, whichever quote style matched
fn label(caps: &Captures<'_>) -> String {
    (1..=3)
        .find_map(|i| caps.get(i))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_section() {
        let source = r#"
describe("Foo", () => {
  it("bar", () => {});
  it("baz", () => {});
});
"#;
        let sections = extract_sections(source);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].name, "Foo");
        assert_eq!(sections[0].scenarios, vec!["bar", "baz"]);
    }

    #[test]
    fn test_quote_styles_and_escapes_verbatim() {
        let source = r#"
describe(`Tpl`, function () {
  test('it\'s here', () => {})
  it("say \"hi\"", () => {})
})
"#;
        let sections = extract_sections(source);
        assert_eq!(sections[0].name, "Tpl");
        assert_eq!(sections[0].scenarios, vec![r"it\'s here", r#"say \"hi\""#]);
    }

    #[test]
    fn test_multiple_sections_and_duplicates() {
        let source = r#"
describe('getDaysInMonth', () => {
  it('월별 기본 일수를 반환한다', () => { expect(x).toBe('}') })
  it('월별 기본 일수를 반환한다', () => {})
})

describe('getWeekDates', () => {
  it.skip('주를 반환한다', () => {})
})
"#;
        let sections = extract_sections(source);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].scenarios, vec!["월별 기본 일수를 반환한다"]);
        assert_eq!(sections[1].name, "getWeekDates");
        assert_eq!(sections[1].scenarios, vec!["주를 반환한다"]);
    }

    #[test]
    fn test_nested_sections_roll_up() {
        let source = r#"
describe('outer', () => {
  it('a', () => {})
  describe('inner', () => {
    it('b', () => {})
  })
})
"#;
        let sections = extract_sections(source);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].scenarios, vec!["a", "b"]);
    }

    #[test]
    fn test_section_without_cases_is_kept() {
        let sections = extract_sections("describe('empty', () => {})");
        assert_eq!(sections, vec![ScenarioSection::new("empty")]);
    }

    #[test]
    fn test_section_without_callback_does_not_steal_next_block() {
        let source = "describe('a')\ndescribe('b', () => { it('x') })";
        let sections = extract_sections(source);
        assert_eq!(sections.len(), 2);
        assert!(sections[0].is_empty());
        assert_eq!(sections[1].scenarios, vec!["x"]);
    }

    #[test]
    fn test_unterminated_section_reads_to_end() {
        let sections = extract_sections("describe('a', () => { it('x', () => {");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].scenarios, vec!["x"]);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let source = "describe('a', () => { it('1'); it('2') })";
        assert_eq!(extract_sections(source), extract_sections(source));
    }

    #[test]
    fn test_extract_imports() {
        let source = r#"
import { describe, it } from 'vitest'
import {
  getDaysInMonth,
  getWeekDates,
} from '../../utils/dateUtils';
import type { Event } from "../../types"
import './setup'
export { helper } from '@/helpers'
import { again } from 'vitest'
"#;
        assert_eq!(
            extract_imports(source),
            vec![
                "vitest",
                "../../utils/dateUtils",
                "../../types",
                "./setup",
                "@/helpers"
            ]
        );
    }

    #[test]
    fn test_commented_out_section_is_ignored() {
        let source = "// describe('old', () => {\ndescribe('real', () => {\n  it('a', () => {})\n})\n";
        let sections = extract_sections(source);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].name, "real");
        assert_eq!(sections[0].scenarios, vec!["a"]);
    }

    #[test]
    fn test_commented_out_cases_are_ignored() {
        let source = r#"
describe('s', () => {
  it('a', () => {})
  // it('disabled', () => {})
  /* it('also disabled', () => {}) */
  it('b', () => { const label = "it('inside a string')" })
})
"#;
        let sections = extract_sections(source);
        assert_eq!(sections[0].scenarios, vec!["a", "b"]);
    }

    #[test]
    fn test_section_call_inside_string_is_ignored() {
        let source = "const s = \"describe('fake', () => {\"\ndescribe('real', () => { it('x') })";
        let sections = extract_sections(source);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].name, "real");
    }

    #[test]
    fn test_imports_sharing_a_line() {
        let source = "import a from './a'; import b from './b'; export { c } from './c'";
        assert_eq!(extract_imports(source), vec!["./a", "./b", "./c"]);
    }

    #[test]
    fn test_mine_source_empty_input() {
        assert_eq!(mine_source(""), MinedSource::default());
    }
}

// pkginit: Requirement resolution for package scaffolding.
// Copyright (C) 2024 International Digital Economy Academy
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

/// Fuzzy-matches `needle` against `haystack`, best match first.
pub fn fuzzy_match<T: AsRef<str>>(
    needle: impl AsRef<str>,
    haystack: impl IntoIterator<Item = T>,
) -> Option<Vec<String>> {
    let mut matcher = nucleo_matcher::Matcher::new(nucleo_matcher::Config::DEFAULT.match_paths());
    let matches = nucleo_matcher::pattern::Pattern::parse(
        needle.as_ref(),
        nucleo_matcher::pattern::CaseMatching::Ignore,
        nucleo_matcher::pattern::Normalization::Smart,
    )
    .match_list(haystack, &mut matcher);
    if matches.is_empty() {
        None
    } else {
        Some(
            matches
                .into_iter()
                .map(|m| m.0.as_ref().to_string())
                .collect(),
        )
    }
}

/// Names from `haystack` within typo distance of `needle`, closest first.
///
/// Unlike [`fuzzy_match`], this tolerates transposed and substituted
/// characters (`acme/tpyo` finds `acme/typo`). Ties are broken by name so
/// the order is stable.
pub fn similar_names<T: AsRef<str>>(
    needle: &str,
    haystack: impl IntoIterator<Item = T>,
    limit: usize,
) -> Vec<String> {
    let needle_lower = needle.to_lowercase();
    let max_distance = (needle_lower.chars().count() / 3).max(2);
    let mut scored: Vec<(usize, String)> = haystack
        .into_iter()
        .filter_map(|name| {
            let name = name.as_ref();
            let distance = edit_distance(&needle_lower, &name.to_lowercase());
            (distance <= max_distance).then(|| (distance, name.to_string()))
        })
        .collect();
    scored.sort();
    scored.dedup_by(|a, b| a.1 == b.1);
    scored.into_iter().take(limit).map(|(_, name)| name).collect()
}

fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut cur = vec![0; b.len() + 1];
    for (i, ca) in a.chars().enumerate() {
        cur[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != *cb);
            cur[j + 1] = substitution.min(prev[j + 1] + 1).min(cur[j] + 1);
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}

#[test]
fn test_fuzzy() {
    let haystack = [
        "acme/core",
        "acme/core-bundle",
        "acme/widgets",
        "symfony/console",
        "symfony/http-kernel",
    ];
    let result = fuzzy_match("acme/core", haystack).unwrap();
    assert_eq!(result[0], "acme/core");
    assert!(result.iter().any(|r| r == "acme/core-bundle"));
    assert!(!result.iter().any(|r| r.starts_with("symfony/")));

    assert_eq!(fuzzy_match("zzz", haystack), None);
}

#[test]
fn test_similar_names() {
    let haystack = [
        "acme/typo",
        "acme/types",
        "acme/core",
        "illuminate/support",
        "acme/typo",
    ];
    expect_test::expect![[r#"
        [
            "acme/typo",
            "acme/types",
        ]
    "#]]
    .assert_debug_eq(&similar_names("acme/tpyo", haystack, 5));

    assert_eq!(similar_names("acme/core", haystack, 5)[0], "acme/core");
    assert_eq!(similar_names("acme/tpyo", haystack, 1), vec!["acme/typo"]);
    assert!(similar_names("totally/unrelated", haystack, 5).is_empty());
}

#[test]
fn test_edit_distance() {
    assert_eq!(edit_distance("", "abc"), 3);
    assert_eq!(edit_distance("kitten", "sitting"), 3);
    assert_eq!(edit_distance("tpyo", "typo"), 2);
    assert_eq!(edit_distance("same", "same"), 0);
}

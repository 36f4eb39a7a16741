use crate::ast::{MapEntry, Range, ResourceParse, Value};

/// A lazy traversal handle. Keys pushed with [`MapTraversal::member`] are
/// only resolved against the parse when [`MapTraversal::parse_node`] is
/// called; a handle for a path that does not exist is perfectly valid.
#[derive(Debug, Clone)]
pub struct MapTraversal<'a> {
    entries: &'a [MapEntry],
    path: Vec<String>,
}

impl<'a> MapTraversal<'a> {
    pub(crate) fn new(entries: &'a [MapEntry]) -> Self {
        Self {
            entries,
            path: Vec::new(),
        }
    }

    pub fn member(mut self, key: impl Into<String>) -> Self {
        self.path.push(key.into());
        self
    }

    pub fn parse_node(&self) -> Option<&'a Value> {
        let (first, rest) = self.path.split_first()?;

        let mut value
            = find(self.entries, first)?;

        for key in rest {
            let Value::Map(map) = value else {
                return None;
            };

            value = find(&map.entries, key)?;
        }

        Some(value)
    }
}

fn find<'a>(entries: &'a [MapEntry], key: &str) -> Option<&'a Value> {
    entries.iter().find(|entry| entry.key == key).map(|entry| &entry.value)
}

/// How a node sits inside its containing structure.
#[derive(Debug, Clone, PartialEq)]
pub enum Containment {
    Map { key: String, key_range: Range },
    Array { index: usize },
    Root { key: String, key_range: Range },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ancestor {
    pub kind: Containment,
    pub range: Range,
}

/// Locates the node whose range equals `target` and returns its chain of
/// containing structures, innermost first. The AST carries no parent
/// links, so containment is recovered by walking the parse from the top.
pub fn ancestors_at(parse: &ResourceParse, target: Range) -> Vec<Ancestor> {
    let mut chain
        = Vec::new();

    for entry in &parse.entries {
        if entry.value.range() == target || search(&entry.value, target, &mut chain) {
            chain.push(Ancestor {
                kind: Containment::Root {
                    key: entry.key.clone(),
                    key_range: entry.key_range,
                },
                range: parse.range,
            });

            return chain;
        }
    }

    chain
}

fn search(value: &Value, target: Range, chain: &mut Vec<Ancestor>) -> bool {
    match value {
        Value::Map(map) => {
            for entry in &map.entries {
                if entry.value.range() == target || search(&entry.value, target, chain) {
                    chain.push(Ancestor {
                        kind: Containment::Map {
                            key: entry.key.clone(),
                            key_range: entry.key_range,
                        },
                        range: map.range,
                    });

                    return true;
                }
            }

            false
        }

        Value::Array { items, range } => {
            for (index, item) in items.iter().enumerate() {
                if item.range() == target || search(item, target, chain) {
                    chain.push(Ancestor {
                        kind: Containment::Array { index },
                        range: *range,
                    });

                    return true;
                }
            }

            false
        }

        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::yaml;

    use super::*;

    #[test]
    fn traversal_resolves_nested_member() {
        let parse = yaml::parse_one("spec:\n  image: nginx\n").unwrap();

        let node = parse.traverse().member("spec").member("image").parse_node().unwrap();

        assert_eq!(node, &Value::String {
            value: "nginx".to_string(),
            range: Range::new(15, 20),
        });
    }

    #[test]
    fn traversal_misses_absent_member() {
        let parse = yaml::parse_one("spec:\n  image: nginx\n").unwrap();

        assert!(parse.traverse().member("spec").member("tag").parse_node().is_none());
        assert!(parse.traverse().member("metadata").parse_node().is_none());
    }

    #[test]
    fn traversal_refuses_to_descend_through_scalars() {
        let parse = yaml::parse_one("spec:\n  image: nginx\n").unwrap();

        assert!(parse.traverse().member("spec").member("image").member("x").parse_node().is_none());
    }

    #[test]
    fn empty_path_resolves_to_nothing() {
        let parse = yaml::parse_one("spec:\n  image: nginx\n").unwrap();

        assert!(parse.traverse().parse_node().is_none());
    }

    #[test]
    fn ancestors_of_nested_map() {
        let parse = yaml::parse_one("spec:\n  settings:\n    mode: fast\n").unwrap();

        let target = parse.traverse().member("spec").member("settings").parse_node().unwrap().range();
        let ancestors = ancestors_at(&parse, target);

        assert_eq!(ancestors.len(), 2);
        assert_eq!(ancestors[0].kind, Containment::Map {
            key: "settings".to_string(),
            key_range: Range::new(8, 16),
        });
        assert_eq!(ancestors[1].kind, Containment::Root {
            key: "spec".to_string(),
            key_range: Range::new(0, 4),
        });
    }

    #[test]
    fn ancestors_of_top_level_entry() {
        let parse = yaml::parse_one("spec:\n  image: nginx\n").unwrap();

        let target = parse.traverse().member("spec").parse_node().unwrap().range();
        let ancestors = ancestors_at(&parse, target);

        assert_eq!(ancestors.len(), 1);
        assert!(matches!(ancestors[0].kind, Containment::Root { ref key, .. } if key == "spec"));
    }

    #[test]
    fn ancestors_of_array_item() {
        let parse = yaml::parse_one("containers:\n  - name: web\n").unwrap();

        let Value::Array { items, .. } = parse.traverse().member("containers").parse_node().unwrap() else {
            panic!("expected an array");
        };

        let ancestors = ancestors_at(&parse, items[0].range());

        assert_eq!(ancestors.len(), 2);
        assert!(matches!(ancestors[0].kind, Containment::Array { index: 0 }));
        assert!(matches!(ancestors[1].kind, Containment::Root { ref key, .. } if key == "containers"));
    }

    #[test]
    fn ancestors_of_unknown_range_are_empty() {
        let parse = yaml::parse_one("spec:\n  image: nginx\n").unwrap();

        assert_eq!(ancestors_at(&parse, Range::new(500, 600)), vec![]);
    }
}

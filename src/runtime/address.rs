//! Resolves a dotted address string to a [`Path`].
//!
//! Labels are resolved by recursing into the block tree to find one and
//! recording the descent as a resume `chain`.

use crate::error::AddressError;
use crate::model::{Block, StoryModel};
use crate::runtime::path::Path;

/// Find `label` inside `stitch`, recursing into choice nodes, condition
/// branches and alts blocks. Returns the chain of indices needed to resume
/// directly at the labelled block.
pub fn find_label(stitch: &[Block], label: &str) -> Option<Vec<usize>> {
    for (index, block) in stitch.iter().enumerate() {
        if block_label(block) == Some(label) {
            return Some(vec![index]);
        }

        if let Some(mut rest) = search_nested(block, label) {
            let mut chain = vec![index];
            chain.append(&mut rest);
            return Some(chain);
        }
    }
    None
}

fn block_label(block: &Block) -> Option<&str> {
    match block {
        Block::Paragraph(p) => p.label.as_deref(),
        Block::Alts(a) => Some(a.label.as_str()),
        _ => None,
    }
}

/// Only descends into choice nodes: a condition's branch is picked fresh on
/// every visit, so a label inside one cannot be resumed into directly (it is
/// still reachable once its branch is naturally entered during forward
/// reading). This keeps a resume `chain` a plain descent through
/// `ChoiceBlock::node`, matching how `continue_from_chain` walks it back in
/// [`crate::runtime::read`].
fn search_nested(block: &Block, label: &str) -> Option<Vec<usize>> {
    match block {
        Block::Choice(choice) => find_label(&choice.node, label),
        _ => None,
    }
}

/// Locate a stitch's label by searching every stitch of `knot` if `stitch`
/// itself is unknown, returning the stitch it was actually found in.
fn find_label_in_knot<'a>(
    model: &'a StoryModel,
    knot: &str,
    preferred_stitch: &'a str,
    label: &str,
) -> Option<(&'a str, Vec<usize>)> {
    let knot_data = model.knot(knot)?;

    if let Some(stitch) = knot_data.stitches.get(preferred_stitch) {
        if let Some(chain) = find_label(stitch, label) {
            return Some((preferred_stitch, chain));
        }
    }

    knot_data.stitches.iter().find_map(|(name, stitch)| {
        find_label(stitch, label).map(|chain| (name.as_str(), chain))
    })
}

/// Resolve a 1-to-3 part dotted address against the current `context`.
pub fn resolve_address(
    raw: &str,
    context: &Path,
    model: &StoryModel,
) -> Result<Path, AddressError> {
    let parts: Vec<&str> = raw.split('.').map(str::trim).collect();

    let err = || AddressError {
        raw_address: raw.to_string(),
        context: Some(context.clone()),
    };

    match parts.as_slice() {
        [knot, stitch, label] => {
            let knot_data = model.knot(knot).ok_or_else(err)?;
            let target_stitch = knot_data.stitches.get(*stitch).ok_or_else(err)?;
            let chain = find_label(target_stitch, label).ok_or_else(err)?;
            Ok(Path {
                knot: knot.to_string(),
                stitch: stitch.to_string(),
                label: Some(label.to_string()),
                chain,
            })
        }
        [first, second] => {
            if let Some(knot_data) = model.knot(first) {
                if knot_data.stitches.contains_key(*second) {
                    return Ok(Path::new(*first, *second));
                }
                let (stitch, chain) =
                    find_label_in_knot(model, first, &knot_data.default_stitch, second)
                        .ok_or_else(err)?;
                return Ok(Path {
                    knot: first.to_string(),
                    stitch: stitch.to_string(),
                    label: Some(second.to_string()),
                    chain,
                });
            }

            let knot_data = model.knot(&context.knot).ok_or_else(err)?;
            if knot_data.stitches.contains_key(*first) {
                let stitch = knot_data.stitches.get(*first).unwrap();
                let chain = find_label(stitch, second).ok_or_else(err)?;
                return Ok(Path {
                    knot: context.knot.clone(),
                    stitch: first.to_string(),
                    label: Some(second.to_string()),
                    chain,
                });
            }

            Err(err())
        }
        [single] => {
            let knot_data = model.knot(&context.knot).ok_or_else(err)?;

            if knot_data.stitches.contains_key(*single) {
                return Ok(Path::new(context.knot.clone(), *single));
            }

            if let Some(knot_data) = model.knot(single) {
                return Ok(Path::new(
                    single.to_string(),
                    knot_data.default_stitch.clone(),
                ));
            }

            if let Some(current_stitch) = knot_data.stitches.get(&context.stitch) {
                if let Some(chain) = find_label(current_stitch, single) {
                    return Ok(Path {
                        knot: context.knot.clone(),
                        stitch: context.stitch.clone(),
                        label: Some(single.to_string()),
                        chain,
                    });
                }
            }

            if let Some((stitch, chain)) =
                find_label_in_knot(model, &context.knot, &context.stitch, single)
            {
                return Ok(Path {
                    knot: context.knot.clone(),
                    stitch: stitch.to_string(),
                    label: Some(single.to_string()),
                    chain,
                });
            }

            Err(err())
        }
        _ => Err(err()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::ROOT_STITCH_NAME;
    use crate::model::{Knot, Paragraph};
    use std::collections::HashMap;

    fn sample_model() -> StoryModel {
        let mut root_stitch = Vec::new();
        root_stitch.push(Block::Paragraph(Paragraph {
            text: Some("Hello.".to_string()),
            label: Some("greet".to_string()),
            divert: None,
            tags: Vec::new(),
        }));

        let mut knot = Knot::new();
        knot.stitches.insert(ROOT_STITCH_NAME.to_string(), root_stitch);
        knot.stitches.insert("arrival".to_string(), Vec::new());

        let mut knots = HashMap::new();
        knots.insert("harbor".to_string(), knot);

        StoryModel {
            knots,
            ..Default::default()
        }
    }

    #[test]
    fn resolves_stitch_within_current_knot() {
        let model = sample_model();
        let context = Path::new("harbor", ROOT_STITCH_NAME);

        let resolved = resolve_address("arrival", &context, &model).unwrap();
        assert_eq!(resolved.knot, "harbor");
        assert_eq!(resolved.stitch, "arrival");
        assert!(resolved.label.is_none());
    }

    #[test]
    fn resolves_label_in_current_stitch() {
        let model = sample_model();
        let context = Path::new("harbor", ROOT_STITCH_NAME);

        let resolved = resolve_address("greet", &context, &model).unwrap();
        assert_eq!(resolved.knot, "harbor");
        assert_eq!(resolved.stitch, ROOT_STITCH_NAME);
        assert_eq!(resolved.label.as_deref(), Some("greet"));
        assert_eq!(resolved.chain, vec![0]);
    }

    #[test]
    fn unknown_address_is_an_error() {
        let model = sample_model();
        let context = Path::new("harbor", ROOT_STITCH_NAME);

        assert!(resolve_address("nowhere", &context, &model).is_err());
    }
}

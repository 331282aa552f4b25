//! The interpreter core: walks a stitch's blocks, maintaining the 3-state
//! read mode, and follows diverts until the reading run must hand control
//! back to the caller (a choice menu is ready, or the story is over).
//!
//! Structured as a recursive descent over the tree-shaped [`Block`] model
//! rather than a flat arena walk.

use crate::consts::{DONE_KNOT, END_KNOT, GLUE_MARKER};
use crate::error::{InternalError, OutOfRangeError, StoryError};
use crate::eval::{eval, expand_inline, parse_expression, EvalContext, Value};
use crate::model::{AltItem, AltsMode, Block, ChoiceBlock, ConditionBlock, ConditionKind, StoryModel};
use crate::runtime::address::resolve_address;
use crate::runtime::context::{HostFunctions, Observers, RuntimeContext};
use crate::runtime::line::{Line, PresentedChoice};
use crate::runtime::path::Path;
use crate::runtime::state::{ReadMode, State};

/// What a block-list walk stopped on.
enum StepResult {
    /// A divert was followed; keep driving from the new path.
    Diverted(Path),
    /// The walk switched to (or was already in) `Choices` mode and has
    /// nothing left to add; the caller must decide between them.
    PresentingChoices,
    /// Reached the end of this list without diverting or presenting a
    /// choice. Meaningful only to the recursive caller that owns this list;
    /// the outermost stitch-level walk turns it into `OutOfContent`.
    Exhausted,
}

/// Begin a story: read from the implicit root knot/stitch.
pub fn start(
    model: &StoryModel,
    state: &mut State,
    functions: &mut HostFunctions,
    observers: &mut Observers,
) -> Result<(), StoryError> {
    if state.in_progress {
        return Err(StoryError::StartOnStoryInProgress);
    }
    state.in_progress = true;
    drive(model, state, functions, observers, Path::root())
}

/// Select a presented choice and continue reading from its branch.
pub fn choose(
    model: &StoryModel,
    state: &mut State,
    functions: &mut HostFunctions,
    observers: &mut Observers,
    selection: usize,
) -> Result<(), StoryError> {
    if state.can_continue() || state.choices.is_empty() {
        return Err(StoryError::MadeChoiceWithoutChoice);
    }
    if selection == 0 || selection > state.choices.len() {
        return Err(StoryError::from(OutOfRangeError {
            selection,
            num_choices: state.choices.len(),
        }));
    }

    let chosen = state.choices[selection - 1].clone();
    state.choices.clear();
    state.pending_fallback = None;

    drive(model, state, functions, observers, chosen.path)
}

fn drive(
    model: &StoryModel,
    state: &mut State,
    functions: &mut HostFunctions,
    observers: &mut Observers,
    mut target: Path,
) -> Result<(), StoryError> {
    loop {
        if target.knot == END_KNOT || target.knot == DONE_KNOT {
            state.is_over = true;
            state.current_path = target;
            return Ok(());
        }

        let unvalidated = || {
            StoryError::Internal(InternalError::UnvalidatedAddress {
                raw: target.to_string(),
            })
        };

        let knot_data = model.knot(&target.knot).ok_or_else(unvalidated)?;
        let stitch_items = knot_data
            .stitches
            .get(&target.stitch)
            .ok_or_else(unvalidated)?;

        let knot_changed = state.current_path.knot != target.knot;
        let stitch_changed = knot_changed || state.current_path.stitch != target.stitch;
        state.visits.bump_scope(&target.knot, &target.stitch, knot_changed);
        if let Some(label) = &target.label {
            state.visits.bump_label(&target.knot, &target.stitch, label);
        }

        if stitch_changed {
            state.temp.clear();
        }

        let path_ctx = Path::new(target.knot.clone(), target.stitch.clone());
        state.current_path = path_ctx.clone();

        let outcome = {
            let mut ctx = RuntimeContext {
                state,
                functions,
                observers,
            };

            if target.chain.is_empty() {
                read_list(
                    stitch_items,
                    0,
                    ReadMode::Text,
                    model,
                    &mut ctx,
                    &path_ctx,
                    Vec::new(),
                )?
            } else {
                continue_from_chain(stitch_items, &target.chain, model, &mut ctx, &path_ctx, Vec::new())?
            }
        };

        match outcome {
            StepResult::Diverted(next) => {
                target = next;
            }
            StepResult::PresentingChoices => {
                if state.choices.is_empty() {
                    if let Some(fallback) = state.pending_fallback.take() {
                        target = fallback;
                        continue;
                    }
                    return Err(StoryError::OutOfChoices {
                        path: state.current_path.clone(),
                    });
                }
                state.pending_fallback = None;
                return Ok(());
            }
            StepResult::Exhausted => {
                return Err(StoryError::OutOfContent);
            }
        }
    }
}

/// Walk `items` starting at `start_index` in `mode`, registering choices and
/// queuing text onto `ctx.state`, until a divert fires, a choice set is
/// ready, or the list runs out.
fn read_list(
    items: &[Block],
    start_index: usize,
    mut mode: ReadMode,
    model: &StoryModel,
    ctx: &mut RuntimeContext,
    path_ctx: &Path,
    chain_prefix: Vec<usize>,
) -> Result<StepResult, StoryError> {
    let mut index = start_index;

    while index < items.len() {
        let block = &items[index];

        if mode == ReadMode::Gathers {
            if matches!(block, Block::Choice(_)) {
                index += 1;
                continue;
            }
            mode = ReadMode::Text;
        }

        if mode == ReadMode::Choices && !matches!(block, Block::Choice(_)) {
            return Ok(StepResult::PresentingChoices);
        }

        match block {
            Block::Paragraph(p) => {
                if let Some(label) = &p.label {
                    ctx.state
                        .visits
                        .bump_label(&path_ctx.knot, &path_ctx.stitch, label);
                }

                if let Some(text) = &p.text {
                    let expanded = expand_inline(text, ctx)?;
                    push_text(ctx.state, expanded, p.tags.clone());
                } else if !p.tags.is_empty() {
                    push_text(ctx.state, String::new(), p.tags.clone());
                }

                if let Some(divert) = &p.divert {
                    let next = resolve_address(divert, path_ctx, model)?;
                    return Ok(StepResult::Diverted(next));
                }

                index += 1;
            }
            Block::Choice(choice) => {
                mode = ReadMode::Choices;
                register_choice(choice, index, &chain_prefix, path_ctx, ctx)?;
                index += 1;
            }
            Block::Condition(cond) => {
                let branch = pick_condition_branch(cond, ctx)?;
                let mut nested_prefix = chain_prefix.clone();
                nested_prefix.push(index);

                let outcome =
                    read_list(branch, 0, mode, model, ctx, path_ctx, nested_prefix)?;

                match outcome {
                    StepResult::Exhausted => index += 1,
                    other => return Ok(other),
                }
            }
            Block::Alts(alts) => {
                if let Some(text) = resolve_alt(alts, path_ctx, ctx)? {
                    push_text(ctx.state, text, Vec::new());
                }
                index += 1;
            }
            Block::Assign(assign) => {
                do_assign(assign, ctx)?;
                index += 1;
            }
        }
    }

    if mode == ReadMode::Choices {
        return Ok(StepResult::PresentingChoices);
    }

    Ok(StepResult::Exhausted)
}

/// Descend a resume `chain`: every entry but the
/// last must be a [`Block::Choice`] whose `node` the chain continues into;
/// the last entry is either the chosen choice itself (narrate its `text`,
/// read its `node`, then fall through to the gather that follows it) or a
/// plain labelled block to resume reading at directly.
fn continue_from_chain(
    items: &[Block],
    chain: &[usize],
    model: &StoryModel,
    ctx: &mut RuntimeContext,
    path_ctx: &Path,
    chain_prefix: Vec<usize>,
) -> Result<StepResult, StoryError> {
    let idx = chain[0];
    let block = items.get(idx).ok_or_else(|| {
        StoryError::Internal(InternalError::CorruptChain {
            path: path_ctx.clone(),
        })
    })?;

    if chain.len() > 1 {
        let choice = match block {
            Block::Choice(choice) => choice,
            _ => {
                return Err(StoryError::Internal(InternalError::CorruptChain {
                    path: path_ctx.clone(),
                }))
            }
        };

        let mut nested_prefix = chain_prefix.clone();
        nested_prefix.push(idx);

        let outcome = continue_from_chain(&choice.node, &chain[1..], model, ctx, path_ctx, nested_prefix)?;
        return fall_through_choice(outcome, choice, items, idx, model, ctx, path_ctx, chain_prefix);
    }

    match block {
        Block::Choice(choice) => {
            mark_choice_entered(path_ctx, &chain_prefix, idx, ctx);

            if let Some(text) = &choice.text {
                let expanded = expand_inline(text, ctx)?;
                push_text(ctx.state, expanded, Vec::new());
            }

            let mut nested_prefix = chain_prefix.clone();
            nested_prefix.push(idx);

            let outcome = read_list(&choice.node, 0, ReadMode::Text, model, ctx, path_ctx, nested_prefix)?;
            fall_through_choice(outcome, choice, items, idx, model, ctx, path_ctx, chain_prefix)
        }
        _ => read_list(items, idx, ReadMode::Text, model, ctx, path_ctx, chain_prefix),
    }
}

/// Once a choice's own `node` has been exhausted, either follow its
/// trailing divert or continue reading its siblings in `Gathers` mode.
fn fall_through_choice(
    outcome: StepResult,
    choice: &ChoiceBlock,
    items: &[Block],
    idx: usize,
    model: &StoryModel,
    ctx: &mut RuntimeContext,
    path_ctx: &Path,
    chain_prefix: Vec<usize>,
) -> Result<StepResult, StoryError> {
    match outcome {
        StepResult::Exhausted => {
            if let Some(divert) = &choice.divert {
                let next = resolve_address(divert, path_ctx, model)?;
                Ok(StepResult::Diverted(next))
            } else {
                read_list(items, idx + 1, ReadMode::Gathers, model, ctx, path_ctx, chain_prefix)
            }
        }
        other => Ok(other),
    }
}

fn choice_key(path_ctx: &Path, chain_prefix: &[usize], idx: usize) -> String {
    let mut chain = chain_prefix.to_vec();
    chain.push(idx);
    let indices: Vec<String> = chain.iter().map(|i| i.to_string()).collect();
    format!("{}.{}#{}", path_ctx.knot, path_ctx.stitch, indices.join("."))
}

fn mark_choice_entered(path_ctx: &Path, chain_prefix: &[usize], idx: usize, ctx: &mut RuntimeContext) {
    let key = choice_key(path_ctx, chain_prefix, idx);
    *ctx.state.choice_entries.entry(key).or_insert(0) += 1;
}

fn register_choice(
    choice: &ChoiceBlock,
    index: usize,
    chain_prefix: &[usize],
    path_ctx: &Path,
    ctx: &mut RuntimeContext,
) -> Result<(), StoryError> {
    let allowed = match &choice.condition {
        Some(src) => eval_bool(src, ctx)?,
        None => true,
    };
    if !allowed {
        return Ok(());
    }

    let mut chain = chain_prefix.to_vec();
    chain.push(index);

    let path = Path {
        knot: path_ctx.knot.clone(),
        stitch: path_ctx.stitch.clone(),
        label: None,
        chain,
    };

    match &choice.choice {
        None => {
            if ctx.state.pending_fallback.is_none() {
                ctx.state.pending_fallback = Some(path);
            }
        }
        Some(caption) => {
            let key = choice_key(path_ctx, chain_prefix, index);
            let already_entered = ctx.state.choice_entries.get(&key).copied().unwrap_or(0) > 0;

            if choice.sticky || !already_entered {
                let expanded = expand_inline(caption, ctx)?;
                ctx.state.choices.push(PresentedChoice {
                    text: expanded,
                    tags: Vec::new(),
                    path,
                });
            }
        }
    }

    Ok(())
}

fn pick_condition_branch<'a>(
    cond: &'a ConditionBlock,
    ctx: &mut RuntimeContext,
) -> Result<&'a [Block], StoryError> {
    match &cond.kind {
        ConditionKind::IfElse { condition, success } => {
            if eval_bool(condition, ctx)? {
                Ok(success)
            } else {
                Ok(&cond.failure)
            }
        }
        ConditionKind::Switch { arms } => {
            for (condition, arm) in arms {
                if eval_bool(condition, ctx)? {
                    return Ok(arm);
                }
            }
            Ok(&cond.failure)
        }
    }
}

fn resolve_alt(
    alts: &crate::model::AltsBlock,
    path_ctx: &Path,
    ctx: &mut RuntimeContext,
) -> Result<Option<String>, StoryError> {
    let n = alts.alts.len();
    if n == 0 {
        return Ok(None);
    }

    ctx.state
        .visits
        .bump_label(&path_ctx.knot, &path_ctx.stitch, &alts.label);
    let visits = ctx
        .state
        .visits
        .label_count(&path_ctx.knot, &path_ctx.stitch, &alts.label);

    let n32 = n as u32;
    let chosen = match alts.mode {
        AltsMode::Stopping => (visits.min(n32) - 1) as usize,
        AltsMode::Cycle => ((visits - 1) % n32) as usize,
        AltsMode::Once => {
            if visits > n32 {
                return Ok(None);
            }
            (visits - 1) as usize
        }
        AltsMode::Shuffle => {
            let pass = (visits - 1) / n32;
            let seed_key = format!("{}:{}", alts.label, pass);
            let order = ctx.state.rng.shuffle_order(&seed_key, n);
            let within_pass = ((visits - 1) % n32) as usize;
            order[within_pass]
        }
    };

    render_alt_item(&alts.alts[chosen], ctx).map(Some)
}

fn render_alt_item(item: &AltItem, ctx: &mut RuntimeContext) -> Result<String, StoryError> {
    match item {
        AltItem::Text(text) => expand_inline(text, ctx).map_err(StoryError::from),
        AltItem::Blocks(blocks) => {
            let mut out = String::new();
            for block in blocks {
                if let Block::Paragraph(p) = block {
                    if let Some(text) = &p.text {
                        let expanded = expand_inline(text, ctx)?;
                        if !out.is_empty() && !expanded.is_empty() {
                            out.push(' ');
                        }
                        out.push_str(&expanded);
                    }
                }
            }
            Ok(out)
        }
    }
}

fn do_assign(assign: &crate::model::AssignBlock, ctx: &mut RuntimeContext) -> Result<(), StoryError> {
    if ctx.state.constants.contains_key(&assign.var) {
        return Err(StoryError::AssignedToConst {
            name: assign.var.clone(),
        });
    }

    let expr = parse_expression(&assign.value).map_err(StoryError::from)?;
    let value = eval(&expr, ctx)?;

    let previous = ctx.state.get_variable(&assign.var);
    let goes_to_temp = assign.temp || ctx.state.temp.contains_key(&assign.var);

    if goes_to_temp {
        ctx.state.temp.insert(assign.var.clone(), value.clone());
    } else {
        ctx.state.variables.insert(assign.var.clone(), value.clone());
    }

    if previous.as_ref() != Some(&value) {
        if let Some(observer) = ctx.observers.get_mut(&assign.var) {
            observer(&value);
        }
    }

    Ok(())
}

fn eval_bool(source: &str, ctx: &mut RuntimeContext) -> Result<bool, StoryError> {
    let expr = parse_expression(source).map_err(StoryError::from)?;
    let value = eval(&expr, ctx)?;
    Ok(value.truthy())
}

/// Append `text` to the pending output queue, merging it with the previous
/// line when either side carries a `<>` glue marker.
fn push_text(state: &mut State, text: String, tags: Vec<String>) {
    let starts_glued = text.starts_with(GLUE_MARKER);
    let mut text = if starts_glued {
        text[GLUE_MARKER.len()..].trim_start().to_string()
    } else {
        text
    };

    let ends_glued = text.ends_with(GLUE_MARKER);
    if ends_glued {
        text = text[..text.len() - GLUE_MARKER.len()].trim_end().to_string();
    }

    let merge = state.glue_open || starts_glued;

    if merge {
        if let Some(last) = state.paragraphs.back_mut() {
            if !last.text.is_empty() && !text.is_empty() {
                last.text.push(' ');
            }
            last.text.push_str(&text);
            last.tags.extend(tags);
        } else if !text.is_empty() || !tags.is_empty() {
            state.paragraphs.push_back(Line { text, tags });
        }
    } else if !text.is_empty() || !tags.is_empty() {
        state.paragraphs.push_back(Line { text, tags });
    }

    state.glue_open = ends_glued;
}

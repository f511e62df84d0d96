//! Sequential step composition shared by validate and sync.
//!
//! Every step receives the same mutable context (the sync client), so steps
//! can read configuration and record state for the steps after them. A failing
//! step ends the pipeline; nothing after it runs.

/// One step of a [`waterfall`]: receives the previous step's output (`None`
/// for the first step).
pub type Step<'a, C, T, E> = Box<dyn FnOnce(&mut C, Option<T>) -> Result<T, E> + 'a>;

/// Box a closure as a [`Step`].
pub fn step<'a, C, T, E>(
    f: impl FnOnce(&mut C, Option<T>) -> Result<T, E> + 'a,
) -> Step<'a, C, T, E> {
    Box::new(f)
}

/// Run `steps` in order, feeding each step's output into the next.
///
/// Returns the last step's output, `Ok(None)` for an empty pipeline, or the
/// first error.
pub fn waterfall<C, T, E>(ctx: &mut C, steps: Vec<Step<'_, C, T, E>>) -> Result<Option<T>, E> {
    let mut carried = None;
    for (index, step) in steps.into_iter().enumerate() {
        tracing::trace!("waterfall step {index}");
        carried = Some(step(ctx, carried)?);
    }
    Ok(carried)
}

/// Run `each` once per item, in order, stopping at the first error.
pub fn for_each_sequential<C, I, E>(
    ctx: &mut C,
    items: impl IntoIterator<Item = I>,
    mut each: impl FnMut(&mut C, I) -> Result<(), E>,
) -> Result<(), E> {
    for item in items {
        each(ctx, item)?;
    }
    Ok(())
}

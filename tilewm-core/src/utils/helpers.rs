//! Small list helpers shared by the handlers.

/// Find the element `shift` places away from the first one matching `reference_finder`.
/// Past either end the search wraps around when `should_loop` is set, otherwise it fails.
///
/// ```
/// let list = vec!["hello", "world", "foo", "bar"];
/// let result = tilewm_core::utils::helpers::relative_find(&list, |&e| e == "world", 2, false);
/// assert_eq!(result, Some(&"bar"));
/// ```
pub fn relative_find<T, F>(
    list: &[T],
    reference_finder: F,
    shift: i32,
    should_loop: bool,
) -> Option<&T>
where
    F: Fn(&T) -> bool,
{
    let reference = list.iter().position(reference_finder)? as i64;
    let len = list.len() as i64;
    let target = reference + i64::from(shift);
    if !should_loop && !(0..len).contains(&target) {
        return None;
    }
    list.get(target.rem_euclid(len) as usize)
}

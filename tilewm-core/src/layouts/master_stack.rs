use crate::models::Xyhw;

/// Layout which splits the usable area into a master column holding the first
/// `master_count` windows and a stack column holding the rest.
///
/// Returns one outer rectangle (border included) per window, in window order.
#[must_use]
pub fn update(
    area: Xyhw,
    window_count: usize,
    master_count: usize,
    split_factor: f32,
    gap: i32,
) -> Vec<Xyhw> {
    if window_count == 0 {
        return vec![];
    }
    if window_count == 1 {
        return vec![area];
    }

    let master_count = master_count.min(window_count);
    let stack_count = window_count - master_count;

    let (master_width, stack_x, stack_width) = match (master_count, stack_count) {
        (_, 0) => (area.w, area.x + area.w, 0),
        (0, _) => (0, area.x, area.w),
        _ => {
            let master_width = (split_factor * area.w as f32) as i32;
            let stack_x = area.x + master_width + gap;
            (master_width, stack_x, area.w - master_width - gap)
        }
    };

    let mut rects = column(area.x, area.y, master_width, area.h, master_count, gap);
    rects.extend(column(stack_x, area.y, stack_width, area.h, stack_count, gap));
    rects
}

/// Split `height` among `count` windows stacked on top of each other. The remainder of the
/// division is handed out one pixel at a time to the first windows.
fn column(x: i32, y: i32, width: i32, height: i32, count: usize, gap: i32) -> Vec<Xyhw> {
    if count == 0 {
        return vec![];
    }
    let count_i32 = count as i32;
    let available = height - gap * (count_i32 - 1);
    let base = available / count_i32;
    let remainder = available % count_i32;

    let mut rects = Vec::with_capacity(count);
    let mut next_y = y;
    for i in 0..count_i32 {
        let h = base + i32::from(i < remainder);
        rects.push(Xyhw::new(x, next_y, width, h));
        next_y += h + gap;
    }
    rects
}

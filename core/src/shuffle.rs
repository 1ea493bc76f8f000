use crate::geometry::Point;
use crate::rng::rand_index;

// Slots walk each rectangular outline left side top-down, right side
// top-down, then the top and bottom rows left to right, one ring at a time.
pub fn shuffle_positions(
    seed: u32,
    total: usize,
    puzzle_width: f32,
    puzzle_height: f32,
    sprite_size: f32,
) -> Vec<Point> {
    let horizontal_sprite_count = ((puzzle_width / sprite_size).floor() as u32).max(1);
    let vertical_sprite_count = ((puzzle_height / sprite_size).floor() as u32).max(1);
    let cell_width = puzzle_width / horizontal_sprite_count as f32;
    let cell_height = puzzle_height / vertical_sprite_count as f32;

    let mut horizontal_cell_count = horizontal_sprite_count + 2;
    let mut vertical_cell_count = vertical_sprite_count;
    let mut outline_index = 1u32;
    let mut outline_cell_index = 0u32;

    let mut remaining: Vec<usize> = (0..total).collect();
    let mut positions = vec![Point::default(); total];
    let mut slot = 0u32;

    while !remaining.is_empty() {
        let outline_origin = Point::new(
            -(outline_index as f32) * cell_width,
            -(outline_index as f32) * cell_height,
        );
        let left_side_last_index = vertical_cell_count - 1;
        let right_side_last_index = left_side_last_index + vertical_cell_count;
        let top_side_last_index = right_side_last_index + horizontal_cell_count;

        let cell = if outline_cell_index <= left_side_last_index {
            (0, outline_cell_index + 1)
        } else if outline_cell_index <= right_side_last_index {
            (
                horizontal_cell_count - 1,
                outline_cell_index - left_side_last_index,
            )
        } else if outline_cell_index <= top_side_last_index {
            (outline_cell_index - right_side_last_index - 1, 0)
        } else {
            (
                outline_cell_index - top_side_last_index - 1,
                vertical_cell_count + 1,
            )
        };

        let pick = rand_index(seed, slot, remaining.len());
        let piece = remaining.swap_remove(pick);
        positions[piece] = Point::new(
            (cell.0 as f32 * cell_width + outline_origin.x + (cell_width - sprite_size) / 2.0)
                .round(),
            (cell.1 as f32 * cell_height + outline_origin.y + (cell_height - sprite_size) / 2.0)
                .round(),
        );

        slot += 1;
        outline_cell_index += 1;
        let outline_cell_count = (horizontal_cell_count + vertical_cell_count) * 2;
        if outline_cell_index == outline_cell_count {
            outline_cell_index = 0;
            outline_index += 1;
            horizontal_cell_count += 2;
            vertical_cell_count += 2;
        }
    }

    positions
}

//! Series colours for the stacked charts, shared by every front end.

use crate::roles::Role;

pub type Rgb = (u8, u8, u8);

const LEVERS: [Rgb; 10] = [
    (0x4e, 0x79, 0xa7),
    (0xf2, 0x8e, 0x2b),
    (0xe1, 0x57, 0x59),
    (0x76, 0xb7, 0xb2),
    (0x59, 0xa1, 0x4f),
    (0xed, 0xc9, 0x49),
    (0xaf, 0x7a, 0xa1),
    (0xff, 0x9d, 0xa7),
    (0x9c, 0x75, 0x5f),
    (0xba, 0xb0, 0xac),
];

const STRATEGIES: [Rgb; 6] = [
    (0x76, 0xa5, 0xaf),
    (0xd0, 0xe2, 0xf3),
    (0x42, 0x86, 0xf5),
    (0xa4, 0xc2, 0xf4),
    (0x86, 0xbc, 0xdb),
    (0x93, 0xa4, 0xc9),
];

/// Colour of the `index`-th series of a chart broken down by `category`.
/// Palettes repeat once they run out.
pub fn series_color(category: Role, index: usize) -> Rgb {
    let palette: &[Rgb] = match category {
        Role::Strategy => &STRATEGIES,
        _ => &LEVERS,
    };
    palette[index % palette.len()]
}

use super::{color_for, Item};

const DEFAULT_NAMES: [&str; 10] = [
    "Pizza",
    "Burger",
    "Sushi",
    "Tacos",
    "Pasta",
    "中式炒饭",
    "意大利面",
    "日式拉面",
    "韩式烤肉",
    "泰式咖喱",
];

/// The starter collection written on first run, ids `"1"` through `"10"`.
pub fn default_items() -> Vec<Item> {
    DEFAULT_NAMES
        .iter()
        .enumerate()
        .map(|(index, name)| Item {
            id: (index + 1).to_string(),
            name: (*name).to_string(),
            color: color_for(index).to_string(),
        })
        .collect()
}

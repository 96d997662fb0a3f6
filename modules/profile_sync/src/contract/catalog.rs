//! Suggested tag values offered by the profile editor.
//!
//! The values are stored verbatim in user records, so they stay in the
//! language the existing data was written in.

/// Common interests (reading, movies, music, travel, sports, cooking,
/// gaming, photography, language learning, yoga, gym, drawing).
pub const COMMON_INTERESTS: [&str; 12] = [
    "Đọc sách",
    "Xem phim",
    "Nghe nhạc",
    "Du lịch",
    "Thể thao",
    "Nấu ăn",
    "Chơi game",
    "Nhiếp ảnh",
    "Học ngoại ngữ",
    "Yoga",
    "Gym",
    "Vẽ",
];

/// Lifestyle habits (tidy, quiet, friendly, non-smoker, non-drinker,
/// early riser, night owl, likes cooking, likes parties, studies a lot).
pub const LIFESTYLE_OPTIONS: [&str; 10] = [
    "Sạch sẽ",
    "Yên tĩnh",
    "Thân thiện",
    "Không hút thuốc",
    "Không uống rượu",
    "Dậy sớm",
    "Đi ngủ muộn",
    "Thích nấu ăn",
    "Thích tiệc tùng",
    "Học tập nhiều",
];

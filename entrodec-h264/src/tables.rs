//! Static CABAC lookup tables.
//!
//! Everything in this module is immutable data from ITU-T H.264 clause
//! 9.3: the range quantization and state transition tables driving the
//! arithmetic engine, the per-syntax-element context offsets, the
//! residual context tables, and the (m, n) initialization coefficients
//! for all 1024 context models.

/// codIRangeLPS lookup, indexed by `[p_state_idx][(codIRange >> 6) & 3]`.
pub const RANGE_TAB_LPS: [[u8; 4]; 64] = [
    [128, 176, 208, 240], [128, 167, 197, 227], [128, 158, 187, 216], [123, 150, 178, 205],
    [116, 142, 169, 195], [111, 135, 160, 185], [105, 128, 152, 175], [100, 122, 144, 166],
    [95, 116, 137, 158], [90, 110, 130, 150], [85, 104, 123, 142], [81, 99, 117, 135],
    [77, 94, 111, 128], [73, 89, 105, 122], [69, 85, 100, 116], [66, 80, 95, 110],
    [62, 76, 90, 104], [59, 72, 86, 99], [56, 69, 81, 94], [53, 65, 77, 89],
    [51, 62, 73, 85], [48, 59, 69, 80], [46, 56, 66, 76], [43, 53, 63, 72],
    [41, 50, 59, 69], [39, 48, 56, 65], [37, 45, 54, 62], [35, 43, 51, 59],
    [33, 41, 48, 56], [32, 39, 46, 53], [30, 37, 43, 50], [29, 35, 41, 48],
    [27, 33, 39, 45], [26, 31, 37, 43], [24, 30, 35, 41], [23, 28, 33, 39],
    [22, 27, 32, 37], [21, 26, 30, 35], [20, 24, 29, 33], [19, 23, 27, 31],
    [18, 22, 26, 30], [17, 21, 25, 28], [16, 20, 23, 27], [15, 19, 22, 25],
    [14, 18, 21, 24], [14, 17, 20, 23], [13, 16, 19, 22], [12, 15, 18, 21],
    [12, 14, 17, 20], [11, 14, 16, 19], [11, 13, 15, 18], [10, 12, 15, 17],
    [10, 12, 14, 16], [9, 11, 13, 15], [9, 11, 12, 14], [8, 10, 12, 14],
    [8, 9, 11, 13], [7, 9, 11, 12], [7, 9, 10, 12], [7, 8, 10, 11],
    [6, 8, 9, 11], [6, 7, 9, 10], [6, 7, 8, 9], [2, 2, 2, 2],
];

/// State transition after decoding the most probable symbol.
pub const TRANS_IDX_MPS: [u8; 64] = [
    1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16,
    17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27, 28, 29, 30, 31, 32,
    33, 34, 35, 36, 37, 38, 39, 40, 41, 42, 43, 44, 45, 46, 47, 48,
    49, 50, 51, 52, 53, 54, 55, 56, 57, 58, 59, 60, 61, 62, 62, 63,
];

/// State transition after decoding the least probable symbol.
pub const TRANS_IDX_LPS: [u8; 64] = [
    0, 0, 1, 2, 2, 4, 4, 5, 6, 7, 8, 9, 9, 11, 11, 12,
    13, 13, 15, 15, 16, 16, 18, 18, 19, 19, 21, 21, 22, 22, 23, 24,
    24, 25, 26, 26, 27, 27, 28, 29, 29, 30, 30, 30, 31, 32, 32, 33,
    33, 33, 34, 34, 35, 35, 35, 36, 36, 36, 37, 37, 37, 38, 38, 63,
];

// Per-syntax-element ctxIdxOffset values.
pub const CTX_MB_TYPE_SI_PREFIX: usize = 0;
pub const CTX_MB_TYPE_I: usize = 3;
pub const CTX_MB_SKIP_FLAG_P: usize = 11;
pub const CTX_MB_TYPE_P_PREFIX: usize = 14;
pub const CTX_MB_TYPE_P_SUFFIX: usize = 17;
pub const CTX_SUB_MB_TYPE_P: usize = 21;
pub const CTX_MB_SKIP_FLAG_B: usize = 24;
pub const CTX_MB_TYPE_B: usize = 27;
pub const CTX_MB_TYPE_B_SUFFIX: usize = 32;
pub const CTX_SUB_MB_TYPE_B: usize = 36;
pub const CTX_MVD_HOR: usize = 40;
pub const CTX_MVD_VER: usize = 47;
pub const CTX_REF_IDX: usize = 54;
pub const CTX_MB_QP_DELTA: usize = 60;
pub const CTX_INTRA_CHROMA_PRED_MODE: usize = 64;
pub const CTX_PREV_INTRA_PRED_MODE_FLAG: usize = 68;
pub const CTX_REM_INTRA_PRED_MODE: usize = 69;
pub const CTX_MB_FIELD_DECODING_FLAG: usize = 70;
pub const CTX_CBP_LUMA: usize = 73;
pub const CTX_CBP_CHROMA: usize = 77;
pub const CTX_TRANSFORM_SIZE_8X8_FLAG: usize = 399;

/// Block-kind factor, keyed directly by ctxBlockCat (0..=13).
///
/// A direct table rather than range tests: the range-test formulation
/// misorders the `cat == 9` case against `9 < cat < 13`.
pub const BLOCK_KIND_FACTOR: [usize; 14] = [1, 1, 1, 1, 1, 2, 3, 3, 3, 5, 4, 4, 4, 6];

/// ctxIdxOffset for significant_coeff_flag, indexed by block-kind factor
/// (0 unused; 1..=6 frame-coded, 7..=12 MBAFF frame, 13..=18 MBAFF field).
pub const SIG_COEFF_BASE: [usize; 19] = [
    0, 105, 402, 484, 528, 660, 718, 105, 402, 484, 528, 660, 718,
    277, 436, 776, 820, 675, 733,
];

/// ctxIdxOffset for last_significant_coeff_flag, same indexing.
pub const LAST_COEFF_BASE: [usize; 19] = [
    0, 166, 417, 572, 616, 690, 748, 166, 417, 572, 616, 690, 748,
    338, 451, 864, 908, 699, 757,
];

/// ctxIdxOffset for coded_block_flag, same indexing (MBAFF-invariant).
pub const CODED_BLOCK_FLAG_BASE: [usize; 19] = [
    0, 85, 1012, 460, 472, 1012, 1012, 85, 1012, 460, 472, 1012, 1012,
    85, 1012, 460, 472, 1012, 1012,
];

/// ctxIdxOffset for the coeff_abs_level_minus1 prefix, same indexing
/// (MBAFF-invariant).
pub const ABS_LEVEL_BASE: [usize; 19] = [
    0, 227, 426, 952, 982, 708, 766, 227, 426, 952, 982, 708, 766,
    227, 426, 952, 982, 708, 766,
];

/// Intra-group ctxIdxBlockCatOffset for significant and last flags.
pub const SIG_LAST_CAT_OFFSET: [usize; 14] = [0, 15, 29, 44, 47, 0, 0, 15, 29, 0, 0, 15, 29, 0];

/// Intra-group ctxIdxBlockCatOffset for coded_block_flag.
pub const CODED_BLOCK_FLAG_CAT_OFFSET: [usize; 14] = [0, 4, 8, 12, 16, 0, 0, 4, 8, 4, 0, 4, 8, 8];

/// Intra-group ctxIdxBlockCatOffset for coeff_abs_level_minus1.
pub const ABS_LEVEL_CAT_OFFSET: [usize; 14] = [0, 10, 20, 30, 39, 0, 0, 10, 20, 0, 0, 10, 20, 0];

/// significant_coeff_flag ctxIdxInc by scan position for 8x8 blocks,
/// frame and field columns.
pub const SIG_COEFF_POS_8X8: [[u8; 63]; 2] = [
    [
        0, 1, 2, 3, 4, 5, 5, 4, 4, 3, 3, 4, 4, 4, 5, 5,
        4, 4, 4, 4, 3, 3, 6, 7, 7, 7, 8, 9, 10, 9, 8, 7,
        7, 6, 11, 12, 13, 11, 6, 7, 8, 9, 14, 10, 9, 8, 6, 11,
        12, 13, 11, 6, 9, 14, 10, 9, 11, 12, 13, 11, 14, 10, 12,
    ],
    [
        0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8,
        8, 9, 9, 10, 10, 11, 11, 12, 12, 13, 13, 13, 13, 13, 13, 13,
        13, 13, 13, 13, 13, 13, 13, 13, 14, 14, 14, 14, 14, 14, 14, 14,
        14, 14, 14, 14, 14, 14, 14, 14, 14, 14, 14, 14, 14, 14, 14,
    ],
];

/// last_significant_coeff_flag ctxIdxInc by scan position for 8x8 blocks.
pub const LAST_COEFF_POS_8X8: [u8; 63] = [
    0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    1, 1, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2, 2,
    2, 2, 2, 2, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3,
    4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 5, 5, 5,
];

/// Initialization coefficients (m, n) for I and SI slices.
pub const CONTEXT_INIT_I: [(i8, i8); 1024] = [
    // 0: mb_type (SI prefix, I)
    (20, -15), (2, 54), (3, 74), (20, -15), (2, 54), (3, 74), (-28, 127), (-23, 104),
    (-6, 53), (-1, 54), (7, 51),
    // 11: mb_skip_flag (P/SP), mb_type (P prefix and suffix)
    (0, 0), (0, 0), (0, 0), (0, 0), (0, 0), (0, 0), (0, 0), (0, 0),
    (0, 0), (0, 0), (0, 0), (0, 0), (0, 0),
    // 24: mb_skip_flag (B)
    (0, 0), (0, 0), (0, 0),
    // 27: mb_type (B)
    (0, 0), (0, 0), (0, 0), (0, 0), (0, 0), (0, 0), (0, 0), (0, 0),
    (0, 0),
    // 36: sub_mb_type (B)
    (0, 0), (0, 0), (0, 0), (0, 0),
    // 40: mvd (horizontal)
    (0, 0), (0, 0), (0, 0), (0, 0), (0, 0), (0, 0), (0, 0),
    // 47: mvd (vertical)
    (0, 0), (0, 0), (0, 0), (0, 0), (0, 0), (0, 0), (0, 0),
    // 54: ref_idx
    (0, 0), (0, 0), (0, 0), (0, 0), (0, 0), (0, 0),
    // 60: mb_qp_delta
    (0, 41), (0, 63), (0, 63), (0, 63),
    // 64: intra_chroma_pred_mode
    (-9, 83), (4, 86), (0, 97), (-7, 72),
    // 68: prev/rem intra pred mode
    (13, 41), (3, 62),
    // 70: mb_field_decoding_flag
    (0, 11), (1, 55), (0, 69),
    // 73: coded_block_pattern (luma)
    (-17, 127), (-13, 102), (0, 82), (-7, 74),
    // 77: coded_block_pattern (chroma)
    (-21, 107), (-27, 127), (-31, 127), (-24, 127), (-18, 95), (-27, 127), (-21, 114), (-30, 127),
    // 85: coded_block_flag (cat 0..4)
    (-17, 123), (-12, 115), (-16, 122), (-11, 115), (-12, 63), (-2, 68), (-15, 84), (-13, 104),
    (-3, 70), (-8, 93), (-10, 90), (-30, 127), (-1, 74), (-6, 97), (-7, 91), (-20, 127),
    (-4, 56), (-5, 82), (-7, 76), (-22, 125),
    // 105: significant_coeff_flag (frame)
    (-7, 93), (-11, 87), (-3, 77), (-5, 71), (-4, 63), (-4, 68), (-12, 84), (-7, 62),
    (-7, 65), (8, 61), (5, 56), (-2, 66), (1, 64), (0, 61), (-2, 78), (1, 50),
    (7, 52), (10, 35), (0, 44), (11, 38), (1, 45), (0, 46), (5, 44), (31, 17),
    (1, 51), (7, 50), (28, 19), (16, 33), (14, 62), (-13, 108), (-15, 100), (-13, 101),
    (-13, 91), (-12, 94), (-10, 88), (-16, 84), (-10, 86), (-7, 83), (-13, 87), (-19, 94),
    (1, 70), (0, 72), (-5, 74), (18, 59), (-8, 102), (-15, 100), (0, 95), (-4, 75),
    (2, 72), (-11, 75), (-3, 71), (15, 46), (-13, 69), (0, 62), (0, 65), (21, 37),
    (-15, 72), (9, 57), (16, 54), (0, 62), (12, 72),
    // 166: last_significant_coeff_flag (frame)
    (24, 0), (15, 9), (8, 25), (13, 18), (15, 9), (13, 19), (10, 37), (12, 18),
    (6, 29), (20, 33), (15, 30), (4, 45), (1, 58), (0, 62), (7, 61), (12, 38),
    (11, 45), (15, 39), (11, 42), (13, 44), (16, 45), (12, 41), (10, 49), (30, 34),
    (18, 42), (10, 55), (17, 51), (17, 46), (0, 89), (26, -19), (22, -17), (26, -17),
    (30, -25), (28, -20), (33, -23), (37, -27), (33, -23), (40, -28), (38, -17), (33, -11),
    (40, -15), (41, -6), (38, 1), (41, 17), (30, -6), (27, 3), (26, 22), (37, -16),
    (35, -4), (38, -8), (38, -3), (37, 3), (38, 5), (42, 0), (35, 16), (39, 22),
    (14, 48), (27, 37), (21, 60), (12, 68), (2, 97),
    // 227: coeff_abs_level_minus1
    (-3, 71), (-6, 42), (-5, 50), (-3, 54), (-2, 62), (0, 58), (1, 63), (-2, 72),
    (-1, 74), (-9, 91), (-5, 67), (-4, 76), (-4, 77), (-6, 76), (5, 66), (-9, 88),
    (-4, 79), (-1, 80), (-7, 72), (4, 58), (9, 41), (18, 25), (9, 32), (5, 43),
    (9, 47), (0, 44), (0, 51), (2, 46), (19, 38), (-4, 66), (15, 38), (12, 42),
    (9, 34), (0, 89), (4, 45), (10, 28), (10, 31), (33, -11), (52, -43), (18, 15),
    (28, 0), (35, -22), (38, -25), (34, 0), (39, -18), (32, -12), (102, -94), (0, 0),
    (56, -15),
    // 276: reserved (end_of_slice_flag decodes via terminate)
    (0, 0),
    // 277: significant_coeff_flag (field)
    (-13, 106), (-16, 106), (-10, 87), (-21, 114), (-18, 110), (-14, 98), (-22, 110), (-21, 106),
    (-18, 103), (-21, 107), (-23, 108), (-26, 112), (-10, 96), (-12, 95), (-5, 91), (-9, 93),
    (-22, 94), (-5, 86), (9, 67), (-4, 80), (-10, 85), (-1, 70), (7, 64), (-10, 84),
    (0, 70), (-4, 78), (-5, 85), (0, 77), (2, 66), (0, 71), (-10, 86), (-12, 92),
    (-15, 55), (-10, 60), (-6, 62), (-4, 65), (-12, 73), (-8, 76), (-7, 80), (-9, 88),
    (-17, 110), (-11, 97), (-20, 84), (-11, 79), (-6, 73), (-4, 74), (-13, 86), (-13, 96),
    (-11, 97), (-19, 117), (-8, 78), (-5, 33), (-4, 48), (-2, 53), (-3, 62), (-13, 71),
    (-10, 79), (-12, 86), (-13, 90), (-14, 97), (0, 0),
    // 338: last_significant_coeff_flag (field)
    (24, 0), (15, 9), (8, 25), (13, 18), (15, 9), (13, 19), (10, 37), (12, 18),
    (6, 29), (20, 33), (15, 30), (4, 45), (1, 58), (0, 62), (7, 61), (12, 38),
    (11, 45), (15, 39), (11, 42), (13, 44), (16, 45), (12, 41), (10, 49), (30, 34),
    (18, 42), (10, 55), (17, 51), (17, 46), (0, 89), (26, -19), (22, -17), (26, -17),
    (30, -25), (28, -20), (33, -23), (37, -27), (33, -23), (40, -28), (38, -17), (33, -11),
    (40, -15), (41, -6), (38, 1), (41, 17), (30, -6), (27, 3), (26, 22), (37, -16),
    (35, -4), (38, -8), (38, -3), (37, 3), (38, 5), (42, 0), (35, 16), (39, 22),
    (14, 48), (27, 37), (21, 60), (12, 68), (2, 97),
    // 399: transform_size_8x8_flag
    (3, 31), (0, 44), (-3, 67),
    // 402: significant_coeff_flag (frame, 8x8)
    (-7, 93), (-11, 87), (-3, 77), (-5, 71), (-4, 63), (-4, 68), (-12, 84), (-7, 62),
    (-7, 65), (8, 61), (5, 56), (-2, 66), (1, 64), (0, 61), (-2, 78),
    // 417: last_significant_coeff_flag (frame, 8x8)
    (24, 0), (15, 9), (8, 25), (13, 18), (15, 9), (13, 19), (10, 37), (12, 18),
    (6, 29),
    // 426: coeff_abs_level_minus1 (8x8)
    (-3, 71), (-6, 42), (-5, 50), (-3, 54), (-2, 62), (0, 58), (1, 63), (-2, 72),
    (-1, 74), (-9, 91),
    // 436: significant_coeff_flag (field, 8x8)
    (-13, 106), (-16, 106), (-10, 87), (-21, 114), (-18, 110), (-14, 98), (-22, 110), (-21, 106),
    (-18, 103), (-21, 107), (-23, 108), (-26, 112), (-10, 96), (-12, 95), (-5, 91),
    // 451: last_significant_coeff_flag (field, 8x8)
    (24, 0), (15, 9), (8, 25), (13, 18), (15, 9), (13, 19), (10, 37), (12, 18),
    (6, 29),
    // 460: coded_block_flag (Cb)
    (-17, 123), (-12, 115), (-16, 122), (-11, 115), (-12, 63), (-2, 68), (-15, 84), (-13, 104),
    (-3, 70), (-8, 93), (-10, 90), (-30, 127),
    // 472: coded_block_flag (Cr)
    (-17, 123), (-12, 115), (-16, 122), (-11, 115), (-12, 63), (-2, 68), (-15, 84), (-13, 104),
    (-3, 70), (-8, 93), (-10, 90), (-30, 127),
    // 484: significant_coeff_flag (frame, Cb)
    (-7, 93), (-11, 87), (-3, 77), (-5, 71), (-4, 63), (-4, 68), (-12, 84), (-7, 62),
    (-7, 65), (8, 61), (5, 56), (-2, 66), (1, 64), (0, 61), (-2, 78), (1, 50),
    (7, 52), (10, 35), (0, 44), (11, 38), (1, 45), (0, 46), (5, 44), (31, 17),
    (1, 51), (7, 50), (28, 19), (16, 33), (14, 62), (-13, 108), (-15, 100), (-13, 101),
    (-13, 91), (-12, 94), (-10, 88), (-16, 84), (-10, 86), (-7, 83), (-13, 87), (-19, 94),
    (1, 70), (0, 72), (-5, 74), (18, 59),
    // 528: significant_coeff_flag (frame, Cr)
    (-7, 93), (-11, 87), (-3, 77), (-5, 71), (-4, 63), (-4, 68), (-12, 84), (-7, 62),
    (-7, 65), (8, 61), (5, 56), (-2, 66), (1, 64), (0, 61), (-2, 78), (1, 50),
    (7, 52), (10, 35), (0, 44), (11, 38), (1, 45), (0, 46), (5, 44), (31, 17),
    (1, 51), (7, 50), (28, 19), (16, 33), (14, 62), (-13, 108), (-15, 100), (-13, 101),
    (-13, 91), (-12, 94), (-10, 88), (-16, 84), (-10, 86), (-7, 83), (-13, 87), (-19, 94),
    (1, 70), (0, 72), (-5, 74), (18, 59),
    // 572: last_significant_coeff_flag (frame, Cb)
    (24, 0), (15, 9), (8, 25), (13, 18), (15, 9), (13, 19), (10, 37), (12, 18),
    (6, 29), (20, 33), (15, 30), (4, 45), (1, 58), (0, 62), (7, 61), (12, 38),
    (11, 45), (15, 39), (11, 42), (13, 44), (16, 45), (12, 41), (10, 49), (30, 34),
    (18, 42), (10, 55), (17, 51), (17, 46), (0, 89), (26, -19), (22, -17), (26, -17),
    (30, -25), (28, -20), (33, -23), (37, -27), (33, -23), (40, -28), (38, -17), (33, -11),
    (40, -15), (41, -6), (38, 1), (41, 17),
    // 616: last_significant_coeff_flag (frame, Cr)
    (24, 0), (15, 9), (8, 25), (13, 18), (15, 9), (13, 19), (10, 37), (12, 18),
    (6, 29), (20, 33), (15, 30), (4, 45), (1, 58), (0, 62), (7, 61), (12, 38),
    (11, 45), (15, 39), (11, 42), (13, 44), (16, 45), (12, 41), (10, 49), (30, 34),
    (18, 42), (10, 55), (17, 51), (17, 46), (0, 89), (26, -19), (22, -17), (26, -17),
    (30, -25), (28, -20), (33, -23), (37, -27), (33, -23), (40, -28), (38, -17), (33, -11),
    (40, -15), (41, -6), (38, 1), (41, 17),
    // 660: significant_coeff_flag (frame, Cb 8x8)
    (-7, 93), (-11, 87), (-3, 77), (-5, 71), (-4, 63), (-4, 68), (-12, 84), (-7, 62),
    (-7, 65), (8, 61), (5, 56), (-2, 66), (1, 64), (0, 61), (-2, 78),
    // 675: significant_coeff_flag (field, Cb 8x8)
    (-13, 106), (-16, 106), (-10, 87), (-21, 114), (-18, 110), (-14, 98), (-22, 110), (-21, 106),
    (-18, 103), (-21, 107), (-23, 108), (-26, 112), (-10, 96), (-12, 95), (-5, 91),
    // 690: last_significant_coeff_flag (frame, Cb 8x8)
    (24, 0), (15, 9), (8, 25), (13, 18), (15, 9), (13, 19), (10, 37), (12, 18),
    (6, 29),
    // 699: last_significant_coeff_flag (field, Cb 8x8)
    (24, 0), (15, 9), (8, 25), (13, 18), (15, 9), (13, 19), (10, 37), (12, 18),
    (6, 29),
    // 708: coeff_abs_level_minus1 (Cb 8x8)
    (-3, 71), (-6, 42), (-5, 50), (-3, 54), (-2, 62), (0, 58), (1, 63), (-2, 72),
    (-1, 74), (-9, 91),
    // 718: significant_coeff_flag (frame, Cr 8x8)
    (-7, 93), (-11, 87), (-3, 77), (-5, 71), (-4, 63), (-4, 68), (-12, 84), (-7, 62),
    (-7, 65), (8, 61), (5, 56), (-2, 66), (1, 64), (0, 61), (-2, 78),
    // 733: significant_coeff_flag (field, Cr 8x8)
    (-13, 106), (-16, 106), (-10, 87), (-21, 114), (-18, 110), (-14, 98), (-22, 110), (-21, 106),
    (-18, 103), (-21, 107), (-23, 108), (-26, 112), (-10, 96), (-12, 95), (-5, 91),
    // 748: last_significant_coeff_flag (frame, Cr 8x8)
    (24, 0), (15, 9), (8, 25), (13, 18), (15, 9), (13, 19), (10, 37), (12, 18),
    (6, 29),
    // 757: last_significant_coeff_flag (field, Cr 8x8)
    (24, 0), (15, 9), (8, 25), (13, 18), (15, 9), (13, 19), (10, 37), (12, 18),
    (6, 29),
    // 766: coeff_abs_level_minus1 (Cr 8x8)
    (-3, 71), (-6, 42), (-5, 50), (-3, 54), (-2, 62), (0, 58), (1, 63), (-2, 72),
    (-1, 74), (-9, 91),
    // 776: significant_coeff_flag (field, Cb)
    (-13, 106), (-16, 106), (-10, 87), (-21, 114), (-18, 110), (-14, 98), (-22, 110), (-21, 106),
    (-18, 103), (-21, 107), (-23, 108), (-26, 112), (-10, 96), (-12, 95), (-5, 91), (-9, 93),
    (-22, 94), (-5, 86), (9, 67), (-4, 80), (-10, 85), (-1, 70), (7, 64), (-10, 84),
    (0, 70), (-4, 78), (-5, 85), (0, 77), (2, 66), (0, 71), (-10, 86), (-12, 92),
    (-15, 55), (-10, 60), (-6, 62), (-4, 65), (-12, 73), (-8, 76), (-7, 80), (-9, 88),
    (-17, 110), (-11, 97), (-20, 84), (-11, 79),
    // 820: significant_coeff_flag (field, Cr)
    (-13, 106), (-16, 106), (-10, 87), (-21, 114), (-18, 110), (-14, 98), (-22, 110), (-21, 106),
    (-18, 103), (-21, 107), (-23, 108), (-26, 112), (-10, 96), (-12, 95), (-5, 91), (-9, 93),
    (-22, 94), (-5, 86), (9, 67), (-4, 80), (-10, 85), (-1, 70), (7, 64), (-10, 84),
    (0, 70), (-4, 78), (-5, 85), (0, 77), (2, 66), (0, 71), (-10, 86), (-12, 92),
    (-15, 55), (-10, 60), (-6, 62), (-4, 65), (-12, 73), (-8, 76), (-7, 80), (-9, 88),
    (-17, 110), (-11, 97), (-20, 84), (-11, 79),
    // 864: last_significant_coeff_flag (field, Cb)
    (24, 0), (15, 9), (8, 25), (13, 18), (15, 9), (13, 19), (10, 37), (12, 18),
    (6, 29), (20, 33), (15, 30), (4, 45), (1, 58), (0, 62), (7, 61), (12, 38),
    (11, 45), (15, 39), (11, 42), (13, 44), (16, 45), (12, 41), (10, 49), (30, 34),
    (18, 42), (10, 55), (17, 51), (17, 46), (0, 89), (26, -19), (22, -17), (26, -17),
    (30, -25), (28, -20), (33, -23), (37, -27), (33, -23), (40, -28), (38, -17), (33, -11),
    (40, -15), (41, -6), (38, 1), (41, 17),
    // 908: last_significant_coeff_flag (field, Cr)
    (24, 0), (15, 9), (8, 25), (13, 18), (15, 9), (13, 19), (10, 37), (12, 18),
    (6, 29), (20, 33), (15, 30), (4, 45), (1, 58), (0, 62), (7, 61), (12, 38),
    (11, 45), (15, 39), (11, 42), (13, 44), (16, 45), (12, 41), (10, 49), (30, 34),
    (18, 42), (10, 55), (17, 51), (17, 46), (0, 89), (26, -19), (22, -17), (26, -17),
    (30, -25), (28, -20), (33, -23), (37, -27), (33, -23), (40, -28), (38, -17), (33, -11),
    (40, -15), (41, -6), (38, 1), (41, 17),
    // 952: coeff_abs_level_minus1 (Cb)
    (-3, 71), (-6, 42), (-5, 50), (-3, 54), (-2, 62), (0, 58), (1, 63), (-2, 72),
    (-1, 74), (-9, 91), (-5, 67), (-4, 76), (-4, 77), (-6, 76), (5, 66), (-9, 88),
    (-4, 79), (-1, 80), (-7, 72), (4, 58), (9, 41), (18, 25), (9, 32), (5, 43),
    (9, 47), (0, 44), (0, 51), (2, 46), (19, 38), (-4, 66),
    // 982: coeff_abs_level_minus1 (Cr)
    (-3, 71), (-6, 42), (-5, 50), (-3, 54), (-2, 62), (0, 58), (1, 63), (-2, 72),
    (-1, 74), (-9, 91), (-5, 67), (-4, 76), (-4, 77), (-6, 76), (5, 66), (-9, 88),
    (-4, 79), (-1, 80), (-7, 72), (4, 58), (9, 41), (18, 25), (9, 32), (5, 43),
    (9, 47), (0, 44), (0, 51), (2, 46), (19, 38), (-4, 66),
    // 1012: coded_block_flag (8x8 luma/Cb/Cr)
    (-17, 123), (-12, 115), (-16, 122), (-11, 115), (-12, 63), (-2, 68), (-15, 84), (-13, 104),
    (-3, 70), (-8, 93), (-10, 90), (-30, 127),
];

/// Initialization coefficients (m, n) for P, SP and B slices,
/// indexed by cabac_init_idc.
pub const CONTEXT_INIT_PB: [[(i8, i8); 1024]; 3] = [
    // cabac_init_idc == 0
    [
        // 0: mb_type (SI prefix, I)
        (20, -15), (2, 54), (3, 74), (20, -15), (2, 54), (3, 74), (-28, 127), (-23, 104),
        (-6, 53), (-1, 54), (7, 51),
        // 11: mb_skip_flag (P/SP), mb_type (P prefix and suffix)
        (23, 33), (23, 2), (21, 0), (1, 9), (0, 49), (-37, 118), (5, 57), (-13, 78),
        (-11, 65), (1, 62), (12, 49), (-4, 73), (17, 50),
        // 24: mb_skip_flag (B)
        (18, 64), (9, 43), (29, 0),
        // 27: mb_type (B)
        (26, 67), (16, 90), (9, 104), (-46, 127), (-20, 104), (1, 67), (-13, 78), (-11, 65),
        (1, 62),
        // 36: sub_mb_type (B)
        (-6, 86), (-17, 95), (-6, 61), (9, 45),
        // 40: mvd (horizontal)
        (-3, 69), (-6, 81), (-11, 96), (6, 55), (7, 67), (-5, 86), (2, 88),
        // 47: mvd (vertical)
        (0, 58), (-3, 76), (-10, 94), (5, 54), (4, 69), (-3, 81), (0, 88),
        // 54: ref_idx
        (-7, 67), (-5, 74), (-4, 74), (-5, 80), (-7, 72), (1, 58),
        // 60: mb_qp_delta
        (0, 41), (0, 63), (0, 63), (0, 63),
        // 64: intra_chroma_pred_mode
        (-9, 83), (4, 86), (0, 97), (-7, 72),
        // 68: prev/rem intra pred mode
        (13, 41), (3, 62),
        // 70: mb_field_decoding_flag
        (0, 45), (-4, 78), (-3, 96),
        // 73: coded_block_pattern (luma)
        (-27, 126), (-28, 98), (-25, 101), (-23, 67),
        // 77: coded_block_pattern (chroma)
        (-28, 82), (-20, 94), (-16, 83), (-22, 110), (-21, 91), (-18, 102), (-13, 93), (-29, 127),
        // 85: coded_block_flag (cat 0..4)
        (-7, 92), (-5, 89), (-7, 96), (-13, 108), (-3, 46), (-1, 65), (-1, 57), (-9, 93),
        (-3, 74), (-9, 92), (-8, 87), (-23, 126), (5, 54), (6, 60), (6, 59), (6, 69),
        (-1, 48), (0, 68), (-4, 69), (-8, 88),
        // 105: significant_coeff_flag (frame)
        (-2, 85), (-6, 78), (-1, 75), (-7, 77), (2, 54), (5, 50), (-3, 68), (1, 50),
        (6, 42), (-4, 81), (1, 63), (-4, 70), (0, 67), (2, 57), (-2, 76), (11, 35),
        (4, 64), (1, 61), (11, 35), (18, 25), (12, 24), (13, 29), (13, 36), (-10, 93),
        (-7, 73), (-2, 73), (13, 46), (9, 49), (-7, 100), (9, 53), (2, 53), (5, 53),
        (-2, 61), (0, 56), (0, 56), (-13, 63), (-5, 60), (-1, 62), (4, 57), (-6, 69),
        (4, 57), (14, 39), (4, 51), (13, 68), (3, 64), (1, 61), (9, 63), (7, 50),
        (16, 39), (5, 44), (4, 52), (11, 48), (-5, 60), (-1, 59), (0, 59), (22, 33),
        (5, 44), (14, 43), (-1, 78), (0, 60), (9, 69),
        // 166: last_significant_coeff_flag (frame)
        (11, 28), (2, 40), (3, 44), (0, 49), (0, 46), (2, 44), (2, 51), (0, 47),
        (4, 39), (2, 62), (6, 46), (0, 54), (3, 54), (2, 58), (4, 63), (6, 51),
        (6, 57), (7, 53), (6, 52), (6, 55), (11, 45), (14, 36), (8, 53), (-1, 82),
        (7, 55), (-3, 78), (15, 46), (22, 31), (-1, 84), (25, 7), (30, -7), (28, 3),
        (28, 4), (32, 0), (34, -1), (30, 6), (30, 6), (32, 9), (31, 19), (26, 27),
        (26, 30), (37, 20), (28, 34), (17, 70), (1, 67), (5, 59), (9, 67), (16, 30),
        (18, 32), (18, 35), (22, 29), (24, 31), (23, 38), (18, 43), (20, 41), (11, 63),
        (9, 59), (9, 64), (-1, 94), (-2, 89), (-9, 108),
        // 227: coeff_abs_level_minus1
        (-6, 76), (-2, 44), (0, 45), (0, 52), (-3, 64), (-2, 59), (-4, 70), (-4, 75),
        (-8, 82), (-17, 102), (-9, 77), (3, 24), (0, 42), (0, 48), (0, 55), (-6, 59),
        (-7, 71), (-12, 83), (-11, 87), (-30, 119), (1, 58), (-3, 29), (-1, 36), (1, 38),
        (2, 43), (-6, 55), (0, 58), (0, 64), (-3, 74), (-10, 90), (0, 70), (-4, 29),
        (5, 31), (7, 42), (1, 59), (-2, 58), (-3, 72), (-3, 81), (-11, 97), (0, 58),
        (8, 5), (10, 14), (14, 18), (13, 27), (2, 40), (0, 58), (-3, 70), (-6, 79),
        (-8, 85),
        // 276: reserved (end_of_slice_flag decodes via terminate)
        (0, 0),
        // 277: significant_coeff_flag (field)
        (-2, 85), (-6, 78), (-1, 75), (-7, 77), (2, 54), (5, 50), (-3, 68), (1, 50),
        (6, 42), (-4, 81), (1, 63), (-4, 70), (0, 67), (2, 57), (-2, 76), (11, 35),
        (4, 64), (1, 61), (11, 35), (18, 25), (12, 24), (13, 29), (13, 36), (-10, 93),
        (-7, 73), (-2, 73), (13, 46), (9, 49), (-7, 100), (9, 53), (2, 53), (5, 53),
        (-2, 61), (0, 56), (0, 56), (-13, 63), (-5, 60), (-1, 62), (4, 57), (-6, 69),
        (4, 57), (14, 39), (4, 51), (13, 68), (3, 64), (1, 61), (9, 63), (7, 50),
        (16, 39), (5, 44), (4, 52), (11, 48), (-5, 60), (-1, 59), (0, 59), (22, 33),
        (5, 44), (14, 43), (-1, 78), (0, 60), (9, 69),
        // 338: last_significant_coeff_flag (field)
        (11, 28), (2, 40), (3, 44), (0, 49), (0, 46), (2, 44), (2, 51), (0, 47),
        (4, 39), (2, 62), (6, 46), (0, 54), (3, 54), (2, 58), (4, 63), (6, 51),
        (6, 57), (7, 53), (6, 52), (6, 55), (11, 45), (14, 36), (8, 53), (-1, 82),
        (7, 55), (-3, 78), (15, 46), (22, 31), (-1, 84), (25, 7), (30, -7), (28, 3),
        (28, 4), (32, 0), (34, -1), (30, 6), (30, 6), (32, 9), (31, 19), (26, 27),
        (26, 30), (37, 20), (28, 34), (17, 70), (1, 67), (5, 59), (9, 67), (16, 30),
        (18, 32), (18, 35), (22, 29), (24, 31), (23, 38), (18, 43), (20, 41), (11, 63),
        (9, 59), (9, 64), (-1, 94), (-2, 89), (-9, 108),
        // 399: transform_size_8x8_flag
        (0, 45), (-4, 78), (-3, 96),
        // 402: significant_coeff_flag (frame, 8x8)
        (-2, 85), (-6, 78), (-1, 75), (-7, 77), (2, 54), (5, 50), (-3, 68), (1, 50),
        (6, 42), (-4, 81), (1, 63), (-4, 70), (0, 67), (2, 57), (-2, 76),
        // 417: last_significant_coeff_flag (frame, 8x8)
        (11, 28), (2, 40), (3, 44), (0, 49), (0, 46), (2, 44), (2, 51), (0, 47),
        (4, 39),
        // 426: coeff_abs_level_minus1 (8x8)
        (-6, 76), (-2, 44), (0, 45), (0, 52), (-3, 64), (-2, 59), (-4, 70), (-4, 75),
        (-8, 82), (-17, 102),
        // 436: significant_coeff_flag (field, 8x8)
        (-2, 85), (-6, 78), (-1, 75), (-7, 77), (2, 54), (5, 50), (-3, 68), (1, 50),
        (6, 42), (-4, 81), (1, 63), (-4, 70), (0, 67), (2, 57), (-2, 76),
        // 451: last_significant_coeff_flag (field, 8x8)
        (11, 28), (2, 40), (3, 44), (0, 49), (0, 46), (2, 44), (2, 51), (0, 47),
        (4, 39),
        // 460: coded_block_flag (Cb)
        (-7, 92), (-5, 89), (-7, 96), (-13, 108), (-3, 46), (-1, 65), (-1, 57), (-9, 93),
        (-3, 74), (-9, 92), (-8, 87), (-23, 126),
        // 472: coded_block_flag (Cr)
        (-7, 92), (-5, 89), (-7, 96), (-13, 108), (-3, 46), (-1, 65), (-1, 57), (-9, 93),
        (-3, 74), (-9, 92), (-8, 87), (-23, 126),
        // 484: significant_coeff_flag (frame, Cb)
        (-2, 85), (-6, 78), (-1, 75), (-7, 77), (2, 54), (5, 50), (-3, 68), (1, 50),
        (6, 42), (-4, 81), (1, 63), (-4, 70), (0, 67), (2, 57), (-2, 76), (11, 35),
        (4, 64), (1, 61), (11, 35), (18, 25), (12, 24), (13, 29), (13, 36), (-10, 93),
        (-7, 73), (-2, 73), (13, 46), (9, 49), (-7, 100), (9, 53), (2, 53), (5, 53),
        (-2, 61), (0, 56), (0, 56), (-13, 63), (-5, 60), (-1, 62), (4, 57), (-6, 69),
        (4, 57), (14, 39), (4, 51), (13, 68),
        // 528: significant_coeff_flag (frame, Cr)
        (-2, 85), (-6, 78), (-1, 75), (-7, 77), (2, 54), (5, 50), (-3, 68), (1, 50),
        (6, 42), (-4, 81), (1, 63), (-4, 70), (0, 67), (2, 57), (-2, 76), (11, 35),
        (4, 64), (1, 61), (11, 35), (18, 25), (12, 24), (13, 29), (13, 36), (-10, 93),
        (-7, 73), (-2, 73), (13, 46), (9, 49), (-7, 100), (9, 53), (2, 53), (5, 53),
        (-2, 61), (0, 56), (0, 56), (-13, 63), (-5, 60), (-1, 62), (4, 57), (-6, 69),
        (4, 57), (14, 39), (4, 51), (13, 68),
        // 572: last_significant_coeff_flag (frame, Cb)
        (11, 28), (2, 40), (3, 44), (0, 49), (0, 46), (2, 44), (2, 51), (0, 47),
        (4, 39), (2, 62), (6, 46), (0, 54), (3, 54), (2, 58), (4, 63), (6, 51),
        (6, 57), (7, 53), (6, 52), (6, 55), (11, 45), (14, 36), (8, 53), (-1, 82),
        (7, 55), (-3, 78), (15, 46), (22, 31), (-1, 84), (25, 7), (30, -7), (28, 3),
        (28, 4), (32, 0), (34, -1), (30, 6), (30, 6), (32, 9), (31, 19), (26, 27),
        (26, 30), (37, 20), (28, 34), (17, 70),
        // 616: last_significant_coeff_flag (frame, Cr)
        (11, 28), (2, 40), (3, 44), (0, 49), (0, 46), (2, 44), (2, 51), (0, 47),
        (4, 39), (2, 62), (6, 46), (0, 54), (3, 54), (2, 58), (4, 63), (6, 51),
        (6, 57), (7, 53), (6, 52), (6, 55), (11, 45), (14, 36), (8, 53), (-1, 82),
        (7, 55), (-3, 78), (15, 46), (22, 31), (-1, 84), (25, 7), (30, -7), (28, 3),
        (28, 4), (32, 0), (34, -1), (30, 6), (30, 6), (32, 9), (31, 19), (26, 27),
        (26, 30), (37, 20), (28, 34), (17, 70),
        // 660: significant_coeff_flag (frame, Cb 8x8)
        (-2, 85), (-6, 78), (-1, 75), (-7, 77), (2, 54), (5, 50), (-3, 68), (1, 50),
        (6, 42), (-4, 81), (1, 63), (-4, 70), (0, 67), (2, 57), (-2, 76),
        // 675: significant_coeff_flag (field, Cb 8x8)
        (-2, 85), (-6, 78), (-1, 75), (-7, 77), (2, 54), (5, 50), (-3, 68), (1, 50),
        (6, 42), (-4, 81), (1, 63), (-4, 70), (0, 67), (2, 57), (-2, 76),
        // 690: last_significant_coeff_flag (frame, Cb 8x8)
        (11, 28), (2, 40), (3, 44), (0, 49), (0, 46), (2, 44), (2, 51), (0, 47),
        (4, 39),
        // 699: last_significant_coeff_flag (field, Cb 8x8)
        (11, 28), (2, 40), (3, 44), (0, 49), (0, 46), (2, 44), (2, 51), (0, 47),
        (4, 39),
        // 708: coeff_abs_level_minus1 (Cb 8x8)
        (-6, 76), (-2, 44), (0, 45), (0, 52), (-3, 64), (-2, 59), (-4, 70), (-4, 75),
        (-8, 82), (-17, 102),
        // 718: significant_coeff_flag (frame, Cr 8x8)
        (-2, 85), (-6, 78), (-1, 75), (-7, 77), (2, 54), (5, 50), (-3, 68), (1, 50),
        (6, 42), (-4, 81), (1, 63), (-4, 70), (0, 67), (2, 57), (-2, 76),
        // 733: significant_coeff_flag (field, Cr 8x8)
        (-2, 85), (-6, 78), (-1, 75), (-7, 77), (2, 54), (5, 50), (-3, 68), (1, 50),
        (6, 42), (-4, 81), (1, 63), (-4, 70), (0, 67), (2, 57), (-2, 76),
        // 748: last_significant_coeff_flag (frame, Cr 8x8)
        (11, 28), (2, 40), (3, 44), (0, 49), (0, 46), (2, 44), (2, 51), (0, 47),
        (4, 39),
        // 757: last_significant_coeff_flag (field, Cr 8x8)
        (11, 28), (2, 40), (3, 44), (0, 49), (0, 46), (2, 44), (2, 51), (0, 47),
        (4, 39),
        // 766: coeff_abs_level_minus1 (Cr 8x8)
        (-6, 76), (-2, 44), (0, 45), (0, 52), (-3, 64), (-2, 59), (-4, 70), (-4, 75),
        (-8, 82), (-17, 102),
        // 776: significant_coeff_flag (field, Cb)
        (-2, 85), (-6, 78), (-1, 75), (-7, 77), (2, 54), (5, 50), (-3, 68), (1, 50),
        (6, 42), (-4, 81), (1, 63), (-4, 70), (0, 67), (2, 57), (-2, 76), (11, 35),
        (4, 64), (1, 61), (11, 35), (18, 25), (12, 24), (13, 29), (13, 36), (-10, 93),
        (-7, 73), (-2, 73), (13, 46), (9, 49), (-7, 100), (9, 53), (2, 53), (5, 53),
        (-2, 61), (0, 56), (0, 56), (-13, 63), (-5, 60), (-1, 62), (4, 57), (-6, 69),
        (4, 57), (14, 39), (4, 51), (13, 68),
        // 820: significant_coeff_flag (field, Cr)
        (-2, 85), (-6, 78), (-1, 75), (-7, 77), (2, 54), (5, 50), (-3, 68), (1, 50),
        (6, 42), (-4, 81), (1, 63), (-4, 70), (0, 67), (2, 57), (-2, 76), (11, 35),
        (4, 64), (1, 61), (11, 35), (18, 25), (12, 24), (13, 29), (13, 36), (-10, 93),
        (-7, 73), (-2, 73), (13, 46), (9, 49), (-7, 100), (9, 53), (2, 53), (5, 53),
        (-2, 61), (0, 56), (0, 56), (-13, 63), (-5, 60), (-1, 62), (4, 57), (-6, 69),
        (4, 57), (14, 39), (4, 51), (13, 68),
        // 864: last_significant_coeff_flag (field, Cb)
        (11, 28), (2, 40), (3, 44), (0, 49), (0, 46), (2, 44), (2, 51), (0, 47),
        (4, 39), (2, 62), (6, 46), (0, 54), (3, 54), (2, 58), (4, 63), (6, 51),
        (6, 57), (7, 53), (6, 52), (6, 55), (11, 45), (14, 36), (8, 53), (-1, 82),
        (7, 55), (-3, 78), (15, 46), (22, 31), (-1, 84), (25, 7), (30, -7), (28, 3),
        (28, 4), (32, 0), (34, -1), (30, 6), (30, 6), (32, 9), (31, 19), (26, 27),
        (26, 30), (37, 20), (28, 34), (17, 70),
        // 908: last_significant_coeff_flag (field, Cr)
        (11, 28), (2, 40), (3, 44), (0, 49), (0, 46), (2, 44), (2, 51), (0, 47),
        (4, 39), (2, 62), (6, 46), (0, 54), (3, 54), (2, 58), (4, 63), (6, 51),
        (6, 57), (7, 53), (6, 52), (6, 55), (11, 45), (14, 36), (8, 53), (-1, 82),
        (7, 55), (-3, 78), (15, 46), (22, 31), (-1, 84), (25, 7), (30, -7), (28, 3),
        (28, 4), (32, 0), (34, -1), (30, 6), (30, 6), (32, 9), (31, 19), (26, 27),
        (26, 30), (37, 20), (28, 34), (17, 70),
        // 952: coeff_abs_level_minus1 (Cb)
        (-6, 76), (-2, 44), (0, 45), (0, 52), (-3, 64), (-2, 59), (-4, 70), (-4, 75),
        (-8, 82), (-17, 102), (-9, 77), (3, 24), (0, 42), (0, 48), (0, 55), (-6, 59),
        (-7, 71), (-12, 83), (-11, 87), (-30, 119), (1, 58), (-3, 29), (-1, 36), (1, 38),
        (2, 43), (-6, 55), (0, 58), (0, 64), (-3, 74), (-10, 90),
        // 982: coeff_abs_level_minus1 (Cr)
        (-6, 76), (-2, 44), (0, 45), (0, 52), (-3, 64), (-2, 59), (-4, 70), (-4, 75),
        (-8, 82), (-17, 102), (-9, 77), (3, 24), (0, 42), (0, 48), (0, 55), (-6, 59),
        (-7, 71), (-12, 83), (-11, 87), (-30, 119), (1, 58), (-3, 29), (-1, 36), (1, 38),
        (2, 43), (-6, 55), (0, 58), (0, 64), (-3, 74), (-10, 90),
        // 1012: coded_block_flag (8x8 luma/Cb/Cr)
        (-7, 92), (-5, 89), (-7, 96), (-13, 108), (-3, 46), (-1, 65), (-1, 57), (-9, 93),
        (-3, 74), (-9, 92), (-8, 87), (-23, 126),
    ],
    // cabac_init_idc == 1
    [
        // 0: mb_type (SI prefix, I)
        (20, -15), (2, 54), (3, 74), (20, -15), (2, 54), (3, 74), (-28, 127), (-23, 104),
        (-6, 53), (-1, 54), (7, 51),
        // 11: mb_skip_flag (P/SP), mb_type (P prefix and suffix)
        (22, 25), (34, 0), (16, 0), (-2, 9), (4, 41), (-29, 118), (2, 65), (-6, 71),
        (-13, 79), (5, 52), (9, 50), (-3, 70), (10, 54),
        // 24: mb_skip_flag (B)
        (26, 34), (19, 22), (40, 0),
        // 27: mb_type (B)
        (57, 2), (41, 36), (26, 69), (-45, 127), (-15, 101), (-4, 76), (-6, 71), (-13, 79),
        (5, 52),
        // 36: sub_mb_type (B)
        (-16, 96), (-7, 88), (-8, 85), (-7, 85),
        // 40: mvd (horizontal)
        (-9, 85), (-13, 88), (4, 66), (-3, 77), (-3, 76), (-6, 76), (10, 58),
        // 47: mvd (vertical)
        (-1, 76), (-1, 83), (-7, 99), (14, 43), (-8, 91), (-20, 127), (-14, 100),
        // 54: ref_idx
        (0, 45), (-2, 61), (-2, 60), (-2, 67), (-8, 80), (-1, 56),
        // 60: mb_qp_delta
        (0, 41), (0, 63), (0, 63), (0, 63),
        // 64: intra_chroma_pred_mode
        (-9, 83), (4, 86), (0, 97), (-7, 72),
        // 68: prev/rem intra pred mode
        (13, 41), (3, 62),
        // 70: mb_field_decoding_flag
        (13, 15), (7, 51), (2, 80),
        // 73: coded_block_pattern (luma)
        (-39, 127), (-18, 91), (-17, 96), (-26, 81),
        // 77: coded_block_pattern (chroma)
        (-35, 98), (-24, 102), (-23, 97), (-27, 119), (-24, 99), (-21, 110), (-18, 102), (-36, 127),
        // 85: coded_block_flag (cat 0..4)
        (0, 80), (-5, 89), (-7, 94), (-4, 92), (0, 39), (0, 65), (-15, 84), (-35, 127),
        (-2, 73), (-12, 104), (-9, 91), (-31, 127), (3, 55), (7, 56), (7, 55), (8, 61),
        (-3, 53), (0, 68), (-7, 74), (-9, 88),
        // 105: significant_coeff_flag (frame)
        (-13, 103), (-13, 91), (-9, 89), (-14, 92), (-8, 76), (-12, 87), (-23, 110), (-24, 105),
        (-10, 78), (-20, 112), (-17, 99), (-78, 127), (-70, 127), (-50, 127), (-46, 127), (-4, 66),
        (-5, 78), (-4, 71), (-8, 72), (2, 59), (-1, 55), (-7, 70), (-6, 75), (-8, 89),
        (-34, 119), (-3, 75), (32, 20), (30, 22), (-44, 127), (0, 54), (-5, 61), (0, 58),
        (-1, 60), (-3, 61), (-8, 67), (-25, 84), (-14, 74), (-5, 65), (5, 52), (2, 57),
        (0, 61), (-9, 69), (-11, 70), (18, 55), (-4, 71), (0, 58), (7, 61), (9, 41),
        (18, 25), (9, 32), (5, 43), (9, 47), (0, 44), (0, 51), (2, 46), (19, 38),
        (-4, 66), (15, 38), (12, 42), (9, 34), (0, 89),
        // 166: last_significant_coeff_flag (frame)
        (4, 45), (10, 28), (10, 31), (33, -11), (52, -43), (18, 15), (28, 0), (35, -22),
        (38, -25), (34, 0), (39, -18), (32, -12), (102, -94), (0, 0), (56, -15), (33, -4),
        (29, 10), (37, -5), (51, -29), (39, -9), (52, -34), (69, -58), (67, -63), (44, -5),
        (32, 7), (55, -29), (32, 1), (0, 0), (27, 36), (33, -25), (34, -30), (36, -28),
        (38, -28), (38, -27), (34, -18), (35, -16), (34, -14), (32, -8), (37, -6), (35, 0),
        (30, 10), (28, 18), (26, 25), (29, 41), (0, 75), (2, 72), (8, 77), (14, 35),
        (18, 31), (17, 35), (21, 30), (17, 45), (20, 42), (18, 45), (27, 26), (16, 54),
        (7, 66), (16, 56), (11, 73), (10, 67), (-10, 116),
        // 227: coeff_abs_level_minus1
        (-6, 76), (-2, 44), (0, 45), (0, 52), (-3, 64), (-2, 59), (-4, 70), (-4, 75),
        (-8, 82), (-17, 102), (-9, 77), (3, 24), (0, 42), (0, 48), (0, 55), (-6, 59),
        (-7, 71), (-12, 83), (-11, 87), (-30, 119), (1, 58), (-3, 29), (-1, 36), (1, 38),
        (2, 43), (-6, 55), (0, 58), (0, 64), (-3, 74), (-10, 90), (0, 70), (-4, 29),
        (5, 31), (7, 42), (1, 59), (-2, 58), (-3, 72), (-3, 81), (-11, 97), (0, 58),
        (8, 5), (10, 14), (14, 18), (13, 27), (2, 40), (0, 58), (-3, 70), (-6, 79),
        (-8, 85),
        // 276: reserved (end_of_slice_flag decodes via terminate)
        (0, 0),
        // 277: significant_coeff_flag (field)
        (-13, 103), (-13, 91), (-9, 89), (-14, 92), (-8, 76), (-12, 87), (-23, 110), (-24, 105),
        (-10, 78), (-20, 112), (-17, 99), (-78, 127), (-70, 127), (-50, 127), (-46, 127), (-4, 66),
        (-5, 78), (-4, 71), (-8, 72), (2, 59), (-1, 55), (-7, 70), (-6, 75), (-8, 89),
        (-34, 119), (-3, 75), (32, 20), (30, 22), (-44, 127), (0, 54), (-5, 61), (0, 58),
        (-1, 60), (-3, 61), (-8, 67), (-25, 84), (-14, 74), (-5, 65), (5, 52), (2, 57),
        (0, 61), (-9, 69), (-11, 70), (18, 55), (-4, 71), (0, 58), (7, 61), (9, 41),
        (18, 25), (9, 32), (5, 43), (9, 47), (0, 44), (0, 51), (2, 46), (19, 38),
        (-4, 66), (15, 38), (12, 42), (9, 34), (0, 89),
        // 338: last_significant_coeff_flag (field)
        (4, 45), (10, 28), (10, 31), (33, -11), (52, -43), (18, 15), (28, 0), (35, -22),
        (38, -25), (34, 0), (39, -18), (32, -12), (102, -94), (0, 0), (56, -15), (33, -4),
        (29, 10), (37, -5), (51, -29), (39, -9), (52, -34), (69, -58), (67, -63), (44, -5),
        (32, 7), (55, -29), (32, 1), (0, 0), (27, 36), (33, -25), (34, -30), (36, -28),
        (38, -28), (38, -27), (34, -18), (35, -16), (34, -14), (32, -8), (37, -6), (35, 0),
        (30, 10), (28, 18), (26, 25), (29, 41), (0, 75), (2, 72), (8, 77), (14, 35),
        (18, 31), (17, 35), (21, 30), (17, 45), (20, 42), (18, 45), (27, 26), (16, 54),
        (7, 66), (16, 56), (11, 73), (10, 67), (-10, 116),
        // 399: transform_size_8x8_flag
        (13, 15), (7, 51), (2, 80),
        // 402: significant_coeff_flag (frame, 8x8)
        (-13, 103), (-13, 91), (-9, 89), (-14, 92), (-8, 76), (-12, 87), (-23, 110), (-24, 105),
        (-10, 78), (-20, 112), (-17, 99), (-78, 127), (-70, 127), (-50, 127), (-46, 127),
        // 417: last_significant_coeff_flag (frame, 8x8)
        (4, 45), (10, 28), (10, 31), (33, -11), (52, -43), (18, 15), (28, 0), (35, -22),
        (38, -25),
        // 426: coeff_abs_level_minus1 (8x8)
        (-6, 76), (-2, 44), (0, 45), (0, 52), (-3, 64), (-2, 59), (-4, 70), (-4, 75),
        (-8, 82), (-17, 102),
        // 436: significant_coeff_flag (field, 8x8)
        (-13, 103), (-13, 91), (-9, 89), (-14, 92), (-8, 76), (-12, 87), (-23, 110), (-24, 105),
        (-10, 78), (-20, 112), (-17, 99), (-78, 127), (-70, 127), (-50, 127), (-46, 127),
        // 451: last_significant_coeff_flag (field, 8x8)
        (4, 45), (10, 28), (10, 31), (33, -11), (52, -43), (18, 15), (28, 0), (35, -22),
        (38, -25),
        // 460: coded_block_flag (Cb)
        (0, 80), (-5, 89), (-7, 94), (-4, 92), (0, 39), (0, 65), (-15, 84), (-35, 127),
        (-2, 73), (-12, 104), (-9, 91), (-31, 127),
        // 472: coded_block_flag (Cr)
        (0, 80), (-5, 89), (-7, 94), (-4, 92), (0, 39), (0, 65), (-15, 84), (-35, 127),
        (-2, 73), (-12, 104), (-9, 91), (-31, 127),
        // 484: significant_coeff_flag (frame, Cb)
        (-13, 103), (-13, 91), (-9, 89), (-14, 92), (-8, 76), (-12, 87), (-23, 110), (-24, 105),
        (-10, 78), (-20, 112), (-17, 99), (-78, 127), (-70, 127), (-50, 127), (-46, 127), (-4, 66),
        (-5, 78), (-4, 71), (-8, 72), (2, 59), (-1, 55), (-7, 70), (-6, 75), (-8, 89),
        (-34, 119), (-3, 75), (32, 20), (30, 22), (-44, 127), (0, 54), (-5, 61), (0, 58),
        (-1, 60), (-3, 61), (-8, 67), (-25, 84), (-14, 74), (-5, 65), (5, 52), (2, 57),
        (0, 61), (-9, 69), (-11, 70), (18, 55),
        // 528: significant_coeff_flag (frame, Cr)
        (-13, 103), (-13, 91), (-9, 89), (-14, 92), (-8, 76), (-12, 87), (-23, 110), (-24, 105),
        (-10, 78), (-20, 112), (-17, 99), (-78, 127), (-70, 127), (-50, 127), (-46, 127), (-4, 66),
        (-5, 78), (-4, 71), (-8, 72), (2, 59), (-1, 55), (-7, 70), (-6, 75), (-8, 89),
        (-34, 119), (-3, 75), (32, 20), (30, 22), (-44, 127), (0, 54), (-5, 61), (0, 58),
        (-1, 60), (-3, 61), (-8, 67), (-25, 84), (-14, 74), (-5, 65), (5, 52), (2, 57),
        (0, 61), (-9, 69), (-11, 70), (18, 55),
        // 572: last_significant_coeff_flag (frame, Cb)
        (4, 45), (10, 28), (10, 31), (33, -11), (52, -43), (18, 15), (28, 0), (35, -22),
        (38, -25), (34, 0), (39, -18), (32, -12), (102, -94), (0, 0), (56, -15), (33, -4),
        (29, 10), (37, -5), (51, -29), (39, -9), (52, -34), (69, -58), (67, -63), (44, -5),
        (32, 7), (55, -29), (32, 1), (0, 0), (27, 36), (33, -25), (34, -30), (36, -28),
        (38, -28), (38, -27), (34, -18), (35, -16), (34, -14), (32, -8), (37, -6), (35, 0),
        (30, 10), (28, 18), (26, 25), (29, 41),
        // 616: last_significant_coeff_flag (frame, Cr)
        (4, 45), (10, 28), (10, 31), (33, -11), (52, -43), (18, 15), (28, 0), (35, -22),
        (38, -25), (34, 0), (39, -18), (32, -12), (102, -94), (0, 0), (56, -15), (33, -4),
        (29, 10), (37, -5), (51, -29), (39, -9), (52, -34), (69, -58), (67, -63), (44, -5),
        (32, 7), (55, -29), (32, 1), (0, 0), (27, 36), (33, -25), (34, -30), (36, -28),
        (38, -28), (38, -27), (34, -18), (35, -16), (34, -14), (32, -8), (37, -6), (35, 0),
        (30, 10), (28, 18), (26, 25), (29, 41),
        // 660: significant_coeff_flag (frame, Cb 8x8)
        (-13, 103), (-13, 91), (-9, 89), (-14, 92), (-8, 76), (-12, 87), (-23, 110), (-24, 105),
        (-10, 78), (-20, 112), (-17, 99), (-78, 127), (-70, 127), (-50, 127), (-46, 127),
        // 675: significant_coeff_flag (field, Cb 8x8)
        (-13, 103), (-13, 91), (-9, 89), (-14, 92), (-8, 76), (-12, 87), (-23, 110), (-24, 105),
        (-10, 78), (-20, 112), (-17, 99), (-78, 127), (-70, 127), (-50, 127), (-46, 127),
        // 690: last_significant_coeff_flag (frame, Cb 8x8)
        (4, 45), (10, 28), (10, 31), (33, -11), (52, -43), (18, 15), (28, 0), (35, -22),
        (38, -25),
        // 699: last_significant_coeff_flag (field, Cb 8x8)
        (4, 45), (10, 28), (10, 31), (33, -11), (52, -43), (18, 15), (28, 0), (35, -22),
        (38, -25),
        // 708: coeff_abs_level_minus1 (Cb 8x8)
        (-6, 76), (-2, 44), (0, 45), (0, 52), (-3, 64), (-2, 59), (-4, 70), (-4, 75),
        (-8, 82), (-17, 102),
        // 718: significant_coeff_flag (frame, Cr 8x8)
        (-13, 103), (-13, 91), (-9, 89), (-14, 92), (-8, 76), (-12, 87), (-23, 110), (-24, 105),
        (-10, 78), (-20, 112), (-17, 99), (-78, 127), (-70, 127), (-50, 127), (-46, 127),
        // 733: significant_coeff_flag (field, Cr 8x8)
        (-13, 103), (-13, 91), (-9, 89), (-14, 92), (-8, 76), (-12, 87), (-23, 110), (-24, 105),
        (-10, 78), (-20, 112), (-17, 99), (-78, 127), (-70, 127), (-50, 127), (-46, 127),
        // 748: last_significant_coeff_flag (frame, Cr 8x8)
        (4, 45), (10, 28), (10, 31), (33, -11), (52, -43), (18, 15), (28, 0), (35, -22),
        (38, -25),
        // 757: last_significant_coeff_flag (field, Cr 8x8)
        (4, 45), (10, 28), (10, 31), (33, -11), (52, -43), (18, 15), (28, 0), (35, -22),
        (38, -25),
        // 766: coeff_abs_level_minus1 (Cr 8x8)
        (-6, 76), (-2, 44), (0, 45), (0, 52), (-3, 64), (-2, 59), (-4, 70), (-4, 75),
        (-8, 82), (-17, 102),
        // 776: significant_coeff_flag (field, Cb)
        (-13, 103), (-13, 91), (-9, 89), (-14, 92), (-8, 76), (-12, 87), (-23, 110), (-24, 105),
        (-10, 78), (-20, 112), (-17, 99), (-78, 127), (-70, 127), (-50, 127), (-46, 127), (-4, 66),
        (-5, 78), (-4, 71), (-8, 72), (2, 59), (-1, 55), (-7, 70), (-6, 75), (-8, 89),
        (-34, 119), (-3, 75), (32, 20), (30, 22), (-44, 127), (0, 54), (-5, 61), (0, 58),
        (-1, 60), (-3, 61), (-8, 67), (-25, 84), (-14, 74), (-5, 65), (5, 52), (2, 57),
        (0, 61), (-9, 69), (-11, 70), (18, 55),
        // 820: significant_coeff_flag (field, Cr)
        (-13, 103), (-13, 91), (-9, 89), (-14, 92), (-8, 76), (-12, 87), (-23, 110), (-24, 105),
        (-10, 78), (-20, 112), (-17, 99), (-78, 127), (-70, 127), (-50, 127), (-46, 127), (-4, 66),
        (-5, 78), (-4, 71), (-8, 72), (2, 59), (-1, 55), (-7, 70), (-6, 75), (-8, 89),
        (-34, 119), (-3, 75), (32, 20), (30, 22), (-44, 127), (0, 54), (-5, 61), (0, 58),
        (-1, 60), (-3, 61), (-8, 67), (-25, 84), (-14, 74), (-5, 65), (5, 52), (2, 57),
        (0, 61), (-9, 69), (-11, 70), (18, 55),
        // 864: last_significant_coeff_flag (field, Cb)
        (4, 45), (10, 28), (10, 31), (33, -11), (52, -43), (18, 15), (28, 0), (35, -22),
        (38, -25), (34, 0), (39, -18), (32, -12), (102, -94), (0, 0), (56, -15), (33, -4),
        (29, 10), (37, -5), (51, -29), (39, -9), (52, -34), (69, -58), (67, -63), (44, -5),
        (32, 7), (55, -29), (32, 1), (0, 0), (27, 36), (33, -25), (34, -30), (36, -28),
        (38, -28), (38, -27), (34, -18), (35, -16), (34, -14), (32, -8), (37, -6), (35, 0),
        (30, 10), (28, 18), (26, 25), (29, 41),
        // 908: last_significant_coeff_flag (field, Cr)
        (4, 45), (10, 28), (10, 31), (33, -11), (52, -43), (18, 15), (28, 0), (35, -22),
        (38, -25), (34, 0), (39, -18), (32, -12), (102, -94), (0, 0), (56, -15), (33, -4),
        (29, 10), (37, -5), (51, -29), (39, -9), (52, -34), (69, -58), (67, -63), (44, -5),
        (32, 7), (55, -29), (32, 1), (0, 0), (27, 36), (33, -25), (34, -30), (36, -28),
        (38, -28), (38, -27), (34, -18), (35, -16), (34, -14), (32, -8), (37, -6), (35, 0),
        (30, 10), (28, 18), (26, 25), (29, 41),
        // 952: coeff_abs_level_minus1 (Cb)
        (-6, 76), (-2, 44), (0, 45), (0, 52), (-3, 64), (-2, 59), (-4, 70), (-4, 75),
        (-8, 82), (-17, 102), (-9, 77), (3, 24), (0, 42), (0, 48), (0, 55), (-6, 59),
        (-7, 71), (-12, 83), (-11, 87), (-30, 119), (1, 58), (-3, 29), (-1, 36), (1, 38),
        (2, 43), (-6, 55), (0, 58), (0, 64), (-3, 74), (-10, 90),
        // 982: coeff_abs_level_minus1 (Cr)
        (-6, 76), (-2, 44), (0, 45), (0, 52), (-3, 64), (-2, 59), (-4, 70), (-4, 75),
        (-8, 82), (-17, 102), (-9, 77), (3, 24), (0, 42), (0, 48), (0, 55), (-6, 59),
        (-7, 71), (-12, 83), (-11, 87), (-30, 119), (1, 58), (-3, 29), (-1, 36), (1, 38),
        (2, 43), (-6, 55), (0, 58), (0, 64), (-3, 74), (-10, 90),
        // 1012: coded_block_flag (8x8 luma/Cb/Cr)
        (0, 80), (-5, 89), (-7, 94), (-4, 92), (0, 39), (0, 65), (-15, 84), (-35, 127),
        (-2, 73), (-12, 104), (-9, 91), (-31, 127),
    ],
    // cabac_init_idc == 2
    [
        // 0: mb_type (SI prefix, I)
        (20, -15), (2, 54), (3, 74), (20, -15), (2, 54), (3, 74), (-28, 127), (-23, 104),
        (-6, 53), (-1, 54), (7, 51),
        // 11: mb_skip_flag (P/SP), mb_type (P prefix and suffix)
        (29, 16), (25, 0), (14, 0), (-10, 51), (-3, 62), (-27, 99), (26, 16), (-4, 85),
        (-24, 102), (5, 57), (6, 57), (-17, 73), (14, 57),
        // 24: mb_skip_flag (B)
        (20, 40), (20, 10), (29, 0),
        // 27: mb_type (B)
        (54, 0), (37, 42), (12, 97), (-32, 127), (-22, 117), (-2, 74), (-4, 85), (-24, 102),
        (5, 57),
        // 36: sub_mb_type (B)
        (-6, 93), (-14, 88), (-6, 44), (4, 55),
        // 40: mvd (horizontal)
        (-11, 89), (-15, 103), (-21, 116), (19, 57), (20, 58), (4, 84), (6, 96),
        // 47: mvd (vertical)
        (1, 63), (-5, 85), (-13, 106), (5, 63), (6, 75), (-3, 90), (-1, 101),
        // 54: ref_idx
        (3, 55), (-4, 79), (-2, 75), (-12, 97), (-7, 50), (1, 60),
        // 60: mb_qp_delta
        (0, 41), (0, 63), (0, 63), (0, 63),
        // 64: intra_chroma_pred_mode
        (-9, 83), (4, 86), (0, 97), (-7, 72),
        // 68: prev/rem intra pred mode
        (13, 41), (3, 62),
        // 70: mb_field_decoding_flag
        (7, 34), (-9, 88), (-20, 127),
        // 73: coded_block_pattern (luma)
        (-36, 127), (-17, 91), (-14, 95), (-25, 84),
        // 77: coded_block_pattern (chroma)
        (-25, 86), (-12, 89), (-17, 91), (-31, 127), (-14, 76), (-18, 103), (-13, 90), (-37, 127),
        // 85: coded_block_flag (cat 0..4)
        (0, 80), (-5, 89), (-7, 94), (-4, 92), (0, 39), (0, 65), (-15, 84), (-35, 127),
        (-2, 73), (-12, 104), (-9, 91), (-31, 127), (3, 55), (7, 56), (7, 55), (8, 61),
        (-3, 53), (0, 68), (-7, 74), (-9, 88),
        // 105: significant_coeff_flag (frame)
        (-13, 103), (-13, 91), (-9, 89), (-14, 92), (-8, 76), (-12, 87), (-23, 110), (-24, 105),
        (-10, 78), (-20, 112), (-17, 99), (-78, 127), (-70, 127), (-50, 127), (-46, 127), (-4, 66),
        (-5, 78), (-4, 71), (-8, 72), (2, 59), (-1, 55), (-7, 70), (-6, 75), (-8, 89),
        (-34, 119), (-3, 75), (32, 20), (30, 22), (-44, 127), (0, 54), (-5, 61), (0, 58),
        (-1, 60), (-3, 61), (-8, 67), (-25, 84), (-14, 74), (-5, 65), (5, 52), (2, 57),
        (0, 61), (-9, 69), (-11, 70), (18, 55), (-4, 71), (0, 58), (7, 61), (9, 41),
        (18, 25), (9, 32), (5, 43), (9, 47), (0, 44), (0, 51), (2, 46), (19, 38),
        (-4, 66), (15, 38), (12, 42), (9, 34), (0, 89),
        // 166: last_significant_coeff_flag (frame)
        (4, 45), (10, 28), (10, 31), (33, -11), (52, -43), (18, 15), (28, 0), (35, -22),
        (38, -25), (34, 0), (39, -18), (32, -12), (102, -94), (0, 0), (56, -15), (33, -4),
        (29, 10), (37, -5), (51, -29), (39, -9), (52, -34), (69, -58), (67, -63), (44, -5),
        (32, 7), (55, -29), (32, 1), (0, 0), (27, 36), (33, -25), (34, -30), (36, -28),
        (38, -28), (38, -27), (34, -18), (35, -16), (34, -14), (32, -8), (37, -6), (35, 0),
        (30, 10), (28, 18), (26, 25), (29, 41), (0, 75), (2, 72), (8, 77), (14, 35),
        (18, 31), (17, 35), (21, 30), (17, 45), (20, 42), (18, 45), (27, 26), (16, 54),
        (7, 66), (16, 56), (11, 73), (10, 67), (-10, 116),
        // 227: coeff_abs_level_minus1
        (-6, 76), (-2, 44), (0, 45), (0, 52), (-3, 64), (-2, 59), (-4, 70), (-4, 75),
        (-8, 82), (-17, 102), (-9, 77), (3, 24), (0, 42), (0, 48), (0, 55), (-6, 59),
        (-7, 71), (-12, 83), (-11, 87), (-30, 119), (1, 58), (-3, 29), (-1, 36), (1, 38),
        (2, 43), (-6, 55), (0, 58), (0, 64), (-3, 74), (-10, 90), (0, 70), (-4, 29),
        (5, 31), (7, 42), (1, 59), (-2, 58), (-3, 72), (-3, 81), (-11, 97), (0, 58),
        (8, 5), (10, 14), (14, 18), (13, 27), (2, 40), (0, 58), (-3, 70), (-6, 79),
        (-8, 85),
        // 276: reserved (end_of_slice_flag decodes via terminate)
        (0, 0),
        // 277: significant_coeff_flag (field)
        (-13, 103), (-13, 91), (-9, 89), (-14, 92), (-8, 76), (-12, 87), (-23, 110), (-24, 105),
        (-10, 78), (-20, 112), (-17, 99), (-78, 127), (-70, 127), (-50, 127), (-46, 127), (-4, 66),
        (-5, 78), (-4, 71), (-8, 72), (2, 59), (-1, 55), (-7, 70), (-6, 75), (-8, 89),
        (-34, 119), (-3, 75), (32, 20), (30, 22), (-44, 127), (0, 54), (-5, 61), (0, 58),
        (-1, 60), (-3, 61), (-8, 67), (-25, 84), (-14, 74), (-5, 65), (5, 52), (2, 57),
        (0, 61), (-9, 69), (-11, 70), (18, 55), (-4, 71), (0, 58), (7, 61), (9, 41),
        (18, 25), (9, 32), (5, 43), (9, 47), (0, 44), (0, 51), (2, 46), (19, 38),
        (-4, 66), (15, 38), (12, 42), (9, 34), (0, 89),
        // 338: last_significant_coeff_flag (field)
        (4, 45), (10, 28), (10, 31), (33, -11), (52, -43), (18, 15), (28, 0), (35, -22),
        (38, -25), (34, 0), (39, -18), (32, -12), (102, -94), (0, 0), (56, -15), (33, -4),
        (29, 10), (37, -5), (51, -29), (39, -9), (52, -34), (69, -58), (67, -63), (44, -5),
        (32, 7), (55, -29), (32, 1), (0, 0), (27, 36), (33, -25), (34, -30), (36, -28),
        (38, -28), (38, -27), (34, -18), (35, -16), (34, -14), (32, -8), (37, -6), (35, 0),
        (30, 10), (28, 18), (26, 25), (29, 41), (0, 75), (2, 72), (8, 77), (14, 35),
        (18, 31), (17, 35), (21, 30), (17, 45), (20, 42), (18, 45), (27, 26), (16, 54),
        (7, 66), (16, 56), (11, 73), (10, 67), (-10, 116),
        // 399: transform_size_8x8_flag
        (7, 34), (-9, 88), (-20, 127),
        // 402: significant_coeff_flag (frame, 8x8)
        (-13, 103), (-13, 91), (-9, 89), (-14, 92), (-8, 76), (-12, 87), (-23, 110), (-24, 105),
        (-10, 78), (-20, 112), (-17, 99), (-78, 127), (-70, 127), (-50, 127), (-46, 127),
        // 417: last_significant_coeff_flag (frame, 8x8)
        (4, 45), (10, 28), (10, 31), (33, -11), (52, -43), (18, 15), (28, 0), (35, -22),
        (38, -25),
        // 426: coeff_abs_level_minus1 (8x8)
        (-6, 76), (-2, 44), (0, 45), (0, 52), (-3, 64), (-2, 59), (-4, 70), (-4, 75),
        (-8, 82), (-17, 102),
        // 436: significant_coeff_flag (field, 8x8)
        (-13, 103), (-13, 91), (-9, 89), (-14, 92), (-8, 76), (-12, 87), (-23, 110), (-24, 105),
        (-10, 78), (-20, 112), (-17, 99), (-78, 127), (-70, 127), (-50, 127), (-46, 127),
        // 451: last_significant_coeff_flag (field, 8x8)
        (4, 45), (10, 28), (10, 31), (33, -11), (52, -43), (18, 15), (28, 0), (35, -22),
        (38, -25),
        // 460: coded_block_flag (Cb)
        (0, 80), (-5, 89), (-7, 94), (-4, 92), (0, 39), (0, 65), (-15, 84), (-35, 127),
        (-2, 73), (-12, 104), (-9, 91), (-31, 127),
        // 472: coded_block_flag (Cr)
        (0, 80), (-5, 89), (-7, 94), (-4, 92), (0, 39), (0, 65), (-15, 84), (-35, 127),
        (-2, 73), (-12, 104), (-9, 91), (-31, 127),
        // 484: significant_coeff_flag (frame, Cb)
        (-13, 103), (-13, 91), (-9, 89), (-14, 92), (-8, 76), (-12, 87), (-23, 110), (-24, 105),
        (-10, 78), (-20, 112), (-17, 99), (-78, 127), (-70, 127), (-50, 127), (-46, 127), (-4, 66),
        (-5, 78), (-4, 71), (-8, 72), (2, 59), (-1, 55), (-7, 70), (-6, 75), (-8, 89),
        (-34, 119), (-3, 75), (32, 20), (30, 22), (-44, 127), (0, 54), (-5, 61), (0, 58),
        (-1, 60), (-3, 61), (-8, 67), (-25, 84), (-14, 74), (-5, 65), (5, 52), (2, 57),
        (0, 61), (-9, 69), (-11, 70), (18, 55),
        // 528: significant_coeff_flag (frame, Cr)
        (-13, 103), (-13, 91), (-9, 89), (-14, 92), (-8, 76), (-12, 87), (-23, 110), (-24, 105),
        (-10, 78), (-20, 112), (-17, 99), (-78, 127), (-70, 127), (-50, 127), (-46, 127), (-4, 66),
        (-5, 78), (-4, 71), (-8, 72), (2, 59), (-1, 55), (-7, 70), (-6, 75), (-8, 89),
        (-34, 119), (-3, 75), (32, 20), (30, 22), (-44, 127), (0, 54), (-5, 61), (0, 58),
        (-1, 60), (-3, 61), (-8, 67), (-25, 84), (-14, 74), (-5, 65), (5, 52), (2, 57),
        (0, 61), (-9, 69), (-11, 70), (18, 55),
        // 572: last_significant_coeff_flag (frame, Cb)
        (4, 45), (10, 28), (10, 31), (33, -11), (52, -43), (18, 15), (28, 0), (35, -22),
        (38, -25), (34, 0), (39, -18), (32, -12), (102, -94), (0, 0), (56, -15), (33, -4),
        (29, 10), (37, -5), (51, -29), (39, -9), (52, -34), (69, -58), (67, -63), (44, -5),
        (32, 7), (55, -29), (32, 1), (0, 0), (27, 36), (33, -25), (34, -30), (36, -28),
        (38, -28), (38, -27), (34, -18), (35, -16), (34, -14), (32, -8), (37, -6), (35, 0),
        (30, 10), (28, 18), (26, 25), (29, 41),
        // 616: last_significant_coeff_flag (frame, Cr)
        (4, 45), (10, 28), (10, 31), (33, -11), (52, -43), (18, 15), (28, 0), (35, -22),
        (38, -25), (34, 0), (39, -18), (32, -12), (102, -94), (0, 0), (56, -15), (33, -4),
        (29, 10), (37, -5), (51, -29), (39, -9), (52, -34), (69, -58), (67, -63), (44, -5),
        (32, 7), (55, -29), (32, 1), (0, 0), (27, 36), (33, -25), (34, -30), (36, -28),
        (38, -28), (38, -27), (34, -18), (35, -16), (34, -14), (32, -8), (37, -6), (35, 0),
        (30, 10), (28, 18), (26, 25), (29, 41),
        // 660: significant_coeff_flag (frame, Cb 8x8)
        (-13, 103), (-13, 91), (-9, 89), (-14, 92), (-8, 76), (-12, 87), (-23, 110), (-24, 105),
        (-10, 78), (-20, 112), (-17, 99), (-78, 127), (-70, 127), (-50, 127), (-46, 127),
        // 675: significant_coeff_flag (field, Cb 8x8)
        (-13, 103), (-13, 91), (-9, 89), (-14, 92), (-8, 76), (-12, 87), (-23, 110), (-24, 105),
        (-10, 78), (-20, 112), (-17, 99), (-78, 127), (-70, 127), (-50, 127), (-46, 127),
        // 690: last_significant_coeff_flag (frame, Cb 8x8)
        (4, 45), (10, 28), (10, 31), (33, -11), (52, -43), (18, 15), (28, 0), (35, -22),
        (38, -25),
        // 699: last_significant_coeff_flag (field, Cb 8x8)
        (4, 45), (10, 28), (10, 31), (33, -11), (52, -43), (18, 15), (28, 0), (35, -22),
        (38, -25),
        // 708: coeff_abs_level_minus1 (Cb 8x8)
        (-6, 76), (-2, 44), (0, 45), (0, 52), (-3, 64), (-2, 59), (-4, 70), (-4, 75),
        (-8, 82), (-17, 102),
        // 718: significant_coeff_flag (frame, Cr 8x8)
        (-13, 103), (-13, 91), (-9, 89), (-14, 92), (-8, 76), (-12, 87), (-23, 110), (-24, 105),
        (-10, 78), (-20, 112), (-17, 99), (-78, 127), (-70, 127), (-50, 127), (-46, 127),
        // 733: significant_coeff_flag (field, Cr 8x8)
        (-13, 103), (-13, 91), (-9, 89), (-14, 92), (-8, 76), (-12, 87), (-23, 110), (-24, 105),
        (-10, 78), (-20, 112), (-17, 99), (-78, 127), (-70, 127), (-50, 127), (-46, 127),
        // 748: last_significant_coeff_flag (frame, Cr 8x8)
        (4, 45), (10, 28), (10, 31), (33, -11), (52, -43), (18, 15), (28, 0), (35, -22),
        (38, -25),
        // 757: last_significant_coeff_flag (field, Cr 8x8)
        (4, 45), (10, 28), (10, 31), (33, -11), (52, -43), (18, 15), (28, 0), (35, -22),
        (38, -25),
        // 766: coeff_abs_level_minus1 (Cr 8x8)
        (-6, 76), (-2, 44), (0, 45), (0, 52), (-3, 64), (-2, 59), (-4, 70), (-4, 75),
        (-8, 82), (-17, 102),
        // 776: significant_coeff_flag (field, Cb)
        (-13, 103), (-13, 91), (-9, 89), (-14, 92), (-8, 76), (-12, 87), (-23, 110), (-24, 105),
        (-10, 78), (-20, 112), (-17, 99), (-78, 127), (-70, 127), (-50, 127), (-46, 127), (-4, 66),
        (-5, 78), (-4, 71), (-8, 72), (2, 59), (-1, 55), (-7, 70), (-6, 75), (-8, 89),
        (-34, 119), (-3, 75), (32, 20), (30, 22), (-44, 127), (0, 54), (-5, 61), (0, 58),
        (-1, 60), (-3, 61), (-8, 67), (-25, 84), (-14, 74), (-5, 65), (5, 52), (2, 57),
        (0, 61), (-9, 69), (-11, 70), (18, 55),
        // 820: significant_coeff_flag (field, Cr)
        (-13, 103), (-13, 91), (-9, 89), (-14, 92), (-8, 76), (-12, 87), (-23, 110), (-24, 105),
        (-10, 78), (-20, 112), (-17, 99), (-78, 127), (-70, 127), (-50, 127), (-46, 127), (-4, 66),
        (-5, 78), (-4, 71), (-8, 72), (2, 59), (-1, 55), (-7, 70), (-6, 75), (-8, 89),
        (-34, 119), (-3, 75), (32, 20), (30, 22), (-44, 127), (0, 54), (-5, 61), (0, 58),
        (-1, 60), (-3, 61), (-8, 67), (-25, 84), (-14, 74), (-5, 65), (5, 52), (2, 57),
        (0, 61), (-9, 69), (-11, 70), (18, 55),
        // 864: last_significant_coeff_flag (field, Cb)
        (4, 45), (10, 28), (10, 31), (33, -11), (52, -43), (18, 15), (28, 0), (35, -22),
        (38, -25), (34, 0), (39, -18), (32, -12), (102, -94), (0, 0), (56, -15), (33, -4),
        (29, 10), (37, -5), (51, -29), (39, -9), (52, -34), (69, -58), (67, -63), (44, -5),
        (32, 7), (55, -29), (32, 1), (0, 0), (27, 36), (33, -25), (34, -30), (36, -28),
        (38, -28), (38, -27), (34, -18), (35, -16), (34, -14), (32, -8), (37, -6), (35, 0),
        (30, 10), (28, 18), (26, 25), (29, 41),
        // 908: last_significant_coeff_flag (field, Cr)
        (4, 45), (10, 28), (10, 31), (33, -11), (52, -43), (18, 15), (28, 0), (35, -22),
        (38, -25), (34, 0), (39, -18), (32, -12), (102, -94), (0, 0), (56, -15), (33, -4),
        (29, 10), (37, -5), (51, -29), (39, -9), (52, -34), (69, -58), (67, -63), (44, -5),
        (32, 7), (55, -29), (32, 1), (0, 0), (27, 36), (33, -25), (34, -30), (36, -28),
        (38, -28), (38, -27), (34, -18), (35, -16), (34, -14), (32, -8), (37, -6), (35, 0),
        (30, 10), (28, 18), (26, 25), (29, 41),
        // 952: coeff_abs_level_minus1 (Cb)
        (-6, 76), (-2, 44), (0, 45), (0, 52), (-3, 64), (-2, 59), (-4, 70), (-4, 75),
        (-8, 82), (-17, 102), (-9, 77), (3, 24), (0, 42), (0, 48), (0, 55), (-6, 59),
        (-7, 71), (-12, 83), (-11, 87), (-30, 119), (1, 58), (-3, 29), (-1, 36), (1, 38),
        (2, 43), (-6, 55), (0, 58), (0, 64), (-3, 74), (-10, 90),
        // 982: coeff_abs_level_minus1 (Cr)
        (-6, 76), (-2, 44), (0, 45), (0, 52), (-3, 64), (-2, 59), (-4, 70), (-4, 75),
        (-8, 82), (-17, 102), (-9, 77), (3, 24), (0, 42), (0, 48), (0, 55), (-6, 59),
        (-7, 71), (-12, 83), (-11, 87), (-30, 119), (1, 58), (-3, 29), (-1, 36), (1, 38),
        (2, 43), (-6, 55), (0, 58), (0, 64), (-3, 74), (-10, 90),
        // 1012: coded_block_flag (8x8 luma/Cb/Cr)
        (0, 80), (-5, 89), (-7, 94), (-4, 92), (0, 39), (0, 65), (-15, 84), (-35, 127),
        (-2, 73), (-12, 104), (-9, 91), (-31, 127),
    ],
];

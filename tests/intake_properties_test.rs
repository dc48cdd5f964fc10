// 缩放与总体积不变量的属性测试
use chat_intake::attachment::{scaled_dimensions, PendingFile, PendingImage, StagingArea, MAX_IMAGE_EDGE};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    PushImage(usize),
    PushFile(usize),
    RemoveImage(usize),
    RemoveFile(usize),
    Clear,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1..400usize).prop_map(Op::PushImage),
        (1..400usize).prop_map(Op::PushFile),
        (0..6usize).prop_map(Op::RemoveImage),
        (0..6usize).prop_map(Op::RemoveFile),
        Just(Op::Clear),
    ]
}

fn image(len: usize) -> PendingImage {
    let prefix = "data:image/png;base64,";
    PendingImage {
        data_uri: format!("{}{}", prefix, "A".repeat(len)),
        media_type: "image/png".to_string(),
        width: 1,
        height: 1,
    }
}

fn file(len: usize) -> PendingFile {
    PendingFile {
        name: "a.txt".to_string(),
        media_type: "text/plain".to_string(),
        size_bytes: len as u64,
        base64_content: "A".repeat(len),
    }
}

proptest! {
    /// 缩放后长边不超过上限，且不会放大。
    #[test]
    fn scaled_long_edge_is_bounded(w in 1..20_000u32, h in 1..20_000u32) {
        let (sw, sh) = scaled_dimensions(w, h, MAX_IMAGE_EDGE);
        prop_assert!(sw.max(sh) <= MAX_IMAGE_EDGE.max(1));
        prop_assert!(sw <= w && sh <= h);
        prop_assert!(sw >= 1 && sh >= 1);
    }

    /// 宽高比在截断误差内保持不变。
    #[test]
    fn scaled_aspect_is_preserved(w in 64..20_000u32, h in 64..20_000u32) {
        let (sw, sh) = scaled_dimensions(w, h, MAX_IMAGE_EDGE);
        let original = w as f64 / h as f64;
        // 短边截断最多损失 1 像素
        let low = sw as f64 / (sh as f64 + 1.0);
        let high = (sw as f64 + 1.0) / sh as f64;
        prop_assert!(original >= low - 1e-9 && original <= high + 1e-9);
    }

    /// 任意操作序列后，总体积等于已暂存内容的长度之和，且不超过上限。
    #[test]
    fn budget_tracks_staged_items(ops in proptest::collection::vec(op(), 1..60), ceiling in 100..3_000u64) {
        let mut staging = StagingArea::new();
        for op in ops {
            match op {
                Op::PushImage(len) => {
                    let before = staging.budget();
                    if staging.try_push_image(image(len), ceiling).is_err() {
                        prop_assert_eq!(staging.budget(), before);
                    }
                }
                Op::PushFile(len) => {
                    let before = staging.budget();
                    if staging.try_push_file(file(len), ceiling).is_err() {
                        prop_assert_eq!(staging.budget(), before);
                    }
                }
                Op::RemoveImage(index) => {
                    staging.remove_image(index);
                }
                Op::RemoveFile(index) => {
                    staging.remove_file(index);
                }
                Op::Clear => staging.clear(),
            }
            prop_assert_eq!(staging.budget(), staging.recomputed_budget());
            prop_assert!(staging.budget() <= ceiling);
        }
    }
}

use tabula::state::virtualizer::{ScrollAlign, Virtualizer, VirtualizerOptions};

fn virtualizer(count: usize) -> Virtualizer {
    let mut v = Virtualizer::new(VirtualizerOptions {
        count,
        estimate_size: 40.0,
        overscan: 5,
        enabled: true,
    });
    v.set_viewport(400.0);
    v
}

fn rendered_size(v: &Virtualizer) -> f64 {
    v.virtual_items().iter().map(|item| item.size).sum()
}

#[test]
fn test_renders_only_the_window_plus_overscan() {
    let mut v = virtualizer(10_000);
    v.on_scroll(4000.0);
    assert_eq!(v.range(), 95..115);
    assert_eq!(v.virtual_items().len(), 20);
    assert_eq!(v.padding_top(), 95.0 * 40.0);
}

#[test]
fn test_top_of_list() {
    let v = virtualizer(10_000);
    assert_eq!(v.range(), 0..15);
    assert_eq!(v.padding_top(), 0.0);
}

#[test]
fn test_paddings_and_rows_add_up_to_total() {
    let mut v = virtualizer(1000);
    v.measure(3, 90.0);
    v.measure(120, 12.0);
    for offset in [0.0, 150.0, 4321.0, 39_000.0, 1e9] {
        v.on_scroll(offset);
        let sum = v.padding_top() + rendered_size(&v) + v.padding_bottom();
        assert!((sum - v.total_size()).abs() < 1e-6, "offset {offset}: {sum}");
    }
}

#[test]
fn test_measurements_shift_later_rows() {
    let mut v = virtualizer(100);
    assert_eq!(v.total_size(), 4000.0);
    v.measure(0, 100.0);
    assert_eq!(v.size_of(0), 100.0);
    assert_eq!(v.start_of(1), 100.0);
    assert_eq!(v.total_size(), 4060.0);
}

#[test]
fn test_measure_ignores_out_of_range_and_bad_sizes() {
    let mut v = virtualizer(10);
    v.measure(10, 80.0);
    v.measure(2, f64::NAN);
    v.measure(3, -1.0);
    assert_eq!(v.total_size(), 400.0);
}

#[test]
fn test_empty_list_and_zero_viewport() {
    let v = virtualizer(0);
    assert!(v.range().is_empty());
    assert_eq!(v.total_size(), 0.0);
    assert_eq!(v.padding_bottom(), 0.0);

    let mut v = virtualizer(50);
    v.set_viewport(0.0);
    assert!(v.range().is_empty());
    assert!(v.visible_data(&[1; 50]).is_empty());
    assert_eq!(v.padding_bottom(), v.total_size());
}

#[test]
fn test_disabled_renders_everything() {
    let mut v = virtualizer(30);
    v.set_enabled(false);
    v.set_viewport(0.0);
    let data: Vec<usize> = (0..30).collect();
    let visible = v.visible_data(&data);
    assert_eq!(visible.len(), 30);
    assert_eq!(*visible[29].item, 29);
    assert_eq!(v.padding_top(), 0.0);
    assert_eq!(v.padding_bottom(), 0.0);
}

#[test]
fn test_visible_data_pairs_rows_with_slots() {
    let mut v = virtualizer(100);
    v.on_scroll(2000.0);
    let data: Vec<String> = (0..100).map(|i| format!("row {i}")).collect();
    let visible = v.visible_data(&data);
    assert_eq!(visible[0].index, 45);
    assert_eq!(visible[0].item, "row 45");
    assert_eq!(visible[0].virtual_item.start, 1800.0);
    assert_eq!(visible[0].virtual_item.end, 1840.0);
}

#[test]
fn test_scroll_offset_is_clamped() {
    let mut v = virtualizer(20);
    v.on_scroll(-50.0);
    assert_eq!(v.scroll_offset(), 0.0);
    v.on_scroll(10_000.0);
    assert_eq!(v.scroll_offset(), 400.0);

    v.set_count(5);
    assert_eq!(v.scroll_offset(), 0.0);
}

#[test]
fn test_scroll_to_index_alignments() {
    let mut v = virtualizer(100);
    v.scroll_to_index(50, ScrollAlign::Start);
    assert_eq!(v.scroll_offset(), 2000.0);

    v.scroll_to_index(50, ScrollAlign::End);
    assert_eq!(v.scroll_offset(), 1640.0);

    v.scroll_to_index(50, ScrollAlign::Center);
    assert_eq!(v.scroll_offset(), 1820.0);

    v.scroll_to_index(48, ScrollAlign::Auto);
    assert_eq!(v.scroll_offset(), 1820.0);

    v.scroll_to_index(10, ScrollAlign::Auto);
    assert_eq!(v.scroll_offset(), 400.0);
}

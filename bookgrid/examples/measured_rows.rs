// Example: dynamic row measurement and scroll jump prevention.
use bookgrid::{RowVirtualizer, RowVirtualizerOptions};

fn main() {
    let mut v = RowVirtualizer::new(RowVirtualizerOptions::new(100, 520));
    v.set_viewport_and_scroll_clamped(900, 20_000);

    println!(
        "before: off={} total={} range={:?}",
        v.scroll_offset(),
        v.total_size(),
        v.virtual_range()
    );

    // A row above the viewport turns out taller than its estimate: `measure`
    // compensates the scroll offset so visible content does not jump.
    let applied = v.measure(2, 640);
    println!(
        "measure(2, 640): applied_delta={applied} off={} total={}",
        v.scroll_offset(),
        v.total_size()
    );

    // A visible row is measured: offsets before it are untouched.
    v.measure(40, 480);
    println!(
        "measure(40, 480): off={} total={}",
        v.scroll_offset(),
        v.total_size()
    );

    // Column count changed upstream: every row boundary moved, start over.
    v.reset_measurements();
    println!("after reset: total={}", v.total_size());
}

// Example: partition a result list into rows and virtualize them.
use bookgrid::{Breakpoints, RowPartition, RowVirtualizer, RowVirtualizerOptions};

fn main() {
    let breakpoints = Breakpoints::default();
    let columns = breakpoints.columns_for(1300);
    println!("viewport 1300px -> {columns} columns");

    let partition = RowPartition::new(47, columns);
    println!(
        "47 items -> {} rows (last row holds {} items)",
        partition.row_count(),
        partition.row_len(partition.row_count() - 1)
    );

    let mut v = RowVirtualizer::new(
        RowVirtualizerOptions::new(partition.row_count(), 520).with_overscan(6),
    );
    v.set_viewport_and_scroll(900, 1200);

    println!("total scrollable height: {}", v.total_size());
    v.for_each_virtual_row(|row| {
        let items = partition.row(row.index).unwrap();
        println!(
            "render row {} at y={} (items {}..{})",
            row.index, row.start, items.start, items.end
        );
    });
}

use crate::*;
use srcup_extract::{sourcemap::parse, FileId, FileRemapping};

fn sample_map() -> String {
    fs::read_to_string(test_data("runtime-sourcemap.txt")).unwrap().trim_end().to_string()
}

#[test]
fn remap_preserves_entry_count_and_order() {
    let input = sample_map();
    let map = parse(&input);
    let remapped = map.remap(&FileRemapping::new(map.referenced_files(), |_| true)).unwrap();
    let out = remapped.to_string();

    let before = input.split(';').collect::<Vec<_>>();
    let after = out.split(';').collect::<Vec<_>>();
    assert_eq!(before.len(), after.len());
    for (before, after) in before.iter().zip(&after) {
        let (b, a) = (before.split(':').collect::<Vec<_>>(), after.split(':').collect::<Vec<_>>());
        assert_eq!(b.len(), a.len());
        for (field, (b, a)) in b.iter().zip(&a).enumerate() {
            if field != 2 {
                assert_eq!(b, a);
            }
        }
    }
}

#[test]
fn remapped_indices_are_minimal() {
    let map = parse(&sample_map());
    let distinct = map.referenced_files().into_iter().filter(|id| !id.is_none()).count();
    let remapped = map.remap(&FileRemapping::new(map.referenced_files(), |_| true)).unwrap();

    let mut expected = vec![FileId::NONE];
    expected.extend((0..distinct as i64).map(FileId));
    assert_eq!(remapped.referenced_files(), expected);
}

#[test]
fn remap_is_deterministic() {
    let input = sample_map();
    let remap = |s: &str| {
        let map = parse(s);
        map.remap(&FileRemapping::new(map.referenced_files(), |_| true)).unwrap().to_string()
    };
    assert_eq!(remap(&input), remap(&input));

    // the first reference doesn't decide the numbering
    let a = remap("0:1:12;0:1:4;0:1:7");
    let b = remap("0:1:7;0:1:12;0:1:4");
    assert_eq!(a, "0:1:2;0:1:0;0:1:1");
    assert_eq!(b, "0:1:1;0:1:2;0:1:0");
}

#[test]
fn two_field_entries_pass_through() {
    let map = parse("1:2:3;10:5;4:5:6");
    let remapped = map.remap(&FileRemapping::new(map.referenced_files(), |_| true)).unwrap();
    assert_eq!(remapped.to_string(), "1:2:0;10:5;4:5:1");
}

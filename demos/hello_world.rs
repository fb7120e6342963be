use memstore_kit::{MemoryStore, StorageBackend, Visibility, WriteOptions};

fn main() {
    // creates a store holding only the root directory ""
    let mut store = MemoryStore::new();

    // creates `docs` on the fly, then the file `docs/first.txt`
    store
        .write("docs/first.txt", b"Hello", &WriteOptions::default())
        .unwrap();

    // files can be created private and with a fixed timestamp
    let options = WriteOptions::new()
        .with_visibility(Visibility::Private)
        .with_timestamp(1_700_000_000);
    store.write("second.txt", b"World", &options).unwrap();

    // writing below a file is refused and changes nothing
    assert!(store.write("second.txt/nope", b"!", &WriteOptions::default()).is_err());

    // reads content of both files
    let first = store.read("docs/first.txt").unwrap().contents;
    let second = store.read("second.txt").unwrap().contents;
    println!(
        "{}, {}!",
        String::from_utf8(first).unwrap(),
        String::from_utf8(second).unwrap()
    );

    for meta in store.list_contents("", true) {
        println!("{:>9}  {}", meta.kind.to_string(), meta.path);
    }

    // moves the second file next to the first one
    store.rename("second.txt", "docs/second.txt").unwrap();
    assert_eq!(store.get_visibility("docs/second.txt").unwrap(), Visibility::Private);

    // removes `docs` with everything inside it
    store.delete_dir("docs").unwrap();
    assert!(store.is_empty());
}

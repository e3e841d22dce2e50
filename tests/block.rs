use vercodec::{derive_safecopy, safe_decode, safe_encode, DecodeError, ParseError, SafeCopy};

pub trait Store {
    type Record;
}

pub struct Memory;

derive_safecopy! {
    #[derive(Debug, PartialEq)]
    pub struct Pair<A, B> {
        a: A,
        b: B,
    }

    type Name = String;

    #[safecopy(version = 1)]
    #[derive(Debug, PartialEq)]
    pub struct Person {
        name: Name,
        nick: Option<Name>,
        tags: Vec<Name>,
    }

    #[safecopy(version = 2)]
    impl<B> SafeCopy for Pair<u8, B>;

    type Bytes = Vec<u8>;

    #[safecopy]
    #[derive(Debug, PartialEq)]
    pub struct Blob {
        a: Bytes,
        b: Vec<u8>,
    }

    #[safecopy(version = 4)]
    type Flags = Pair<u16, bool>;

    #[derive(Debug, PartialEq)]
    pub enum MemRecord {
        Empty,
        Full(u32),
    }

    impl Store for Memory {
        type Record = MemRecord;
    }

    #[safecopy(strategy = simple)]
    impl SafeCopy for <Memory as Store>::Record;
}

pub type OuterBytes = Vec<u8>;

#[derive(SafeCopy, Debug, PartialEq)]
pub struct OuterBlob {
    a: OuterBytes,
    b: Vec<u8>,
}

fn roundtrip<T: SafeCopy + PartialEq + std::fmt::Debug>(value: T) {
    let bytes = safe_encode(&value);
    assert_eq!(safe_decode::<T, _>(bytes).unwrap(), value);
}

#[test]
fn aliases_expand_in_fields() {
    let person = Person {
        name: "ada".into(),
        nick: None,
        tags: vec!["x".into()],
    };
    roundtrip(person);
    assert_eq!(Person::error_type_name(), "Person");
    assert_eq!(<Person as SafeCopy>::VERSION.get(), 1);
}

#[test]
fn aliases_share_versions_only_within_a_block() {
    let blob = Blob {
        a: vec![1],
        b: vec![2],
    };
    assert_eq!(
        safe_encode(&blob),
        vec![
            0, 0, 0, 0, // Blob
            0, 0, 0, 0, // Vec<u8>, once
            0, 0, 0, 0, 0, 0, 0, 1, 1, //
            0, 0, 0, 0, 0, 0, 0, 1, 2,
        ]
    );
    roundtrip(blob);

    let outer = OuterBlob {
        a: vec![1],
        b: vec![2],
    };
    assert_eq!(
        safe_encode(&outer),
        vec![
            0, 0, 0, 0, // OuterBlob
            0, 0, 0, 0, // OuterBytes
            0, 0, 0, 0, // Vec<u8>
            0, 0, 0, 0, 0, 0, 0, 1, 1, //
            0, 0, 0, 0, 0, 0, 0, 1, 2,
        ]
    );
    roundtrip(outer);
}

#[test]
fn instantiations_fix_leading_arguments() {
    let p = Pair { a: 7u8, b: 300u16 };
    assert_eq!(safe_encode(&p), vec![0, 0, 0, 2, 7, 1, 44]);
    roundtrip(p);
    roundtrip(Pair {
        a: 1u8,
        b: Pair { a: 2u8, b: 3u8 },
    });
    assert_eq!(<Pair<u8, bool> as SafeCopy>::error_type_name(), "Pair<u8, B>");
}

#[test]
fn aliases_can_be_derived_for() {
    let flags: Flags = Pair { a: 1, b: true };
    assert_eq!(safe_encode(&flags), vec![0, 0, 0, 4, 0, 1, 0xff]);
    roundtrip(flags);
    assert_eq!(Flags::error_type_name(), "Flags");
}

#[test]
fn projections_resolve_to_the_instance_body() {
    assert_eq!(
        safe_encode(&MemRecord::Full(5)),
        vec![0, 0, 0, 0, 1, 0, 0, 0, 5]
    );
    roundtrip(MemRecord::Empty);
    let record: <Memory as Store>::Record = MemRecord::Full(9);
    roundtrip(record);

    let err = safe_decode::<MemRecord, _>(vec![0u8, 0, 0, 0, 2]).unwrap_err();
    let err = match err {
        DecodeError::Parse(err) => err,
        other => panic!("unexpected {:?}", other),
    };
    assert_eq!(err.labels(), &["<Memory as Store>::Record"]);
    assert!(matches!(err.root(), ParseError::Token(_)));
}

#[test]
fn tuples_report_their_shape() {
    assert_eq!(<(u8, u16) as SafeCopy>::error_type_name(), "(A, B)");
    assert_eq!(safe_encode(&(1u8, 2u16)), vec![1, 0, 2]);
    roundtrip((1u8, String::from("a"), vec![true]));
}

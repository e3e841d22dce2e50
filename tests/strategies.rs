use vercodec::{safe_decode, safe_encode, DecodeError, ParseError, SafeCopy};

#[derive(SafeCopy, Debug, PartialEq, Clone)]
#[safecopy(version = 3)]
struct Wrap(u8);

#[derive(SafeCopy, Debug, PartialEq, Clone)]
enum Normal<A, B> {
    C(A, A),
    D(B, i64),
}

#[derive(SafeCopy, Debug, PartialEq, Clone)]
#[safecopy(strategy = simple)]
enum Simple<A, B> {
    C(A, A),
    D(B, i64),
}

#[derive(SafeCopy, Debug, PartialEq, Clone)]
#[safecopy(strategy = legacy)]
enum Legacy<A, B> {
    C(A, A),
    D(B, i64),
}

#[derive(SafeCopy, Debug, PartialEq, Clone)]
#[safecopy(version = 1)]
struct Point {
    x: u16,
    y: u16,
}

#[derive(SafeCopy, Debug, PartialEq, Clone)]
#[safecopy(version = 1, strategy = legacy)]
struct LegacyPoint {
    x: u16,
    y: u16,
}

#[derive(SafeCopy, Debug, PartialEq, Clone)]
enum Unit {
    Only,
}

#[derive(SafeCopy, Debug, PartialEq, Clone)]
struct Labels {
    a: Vec<u8>,
    b: Vec<u8>,
    c: Wrap,
    d: Vec<u8>,
}

#[derive(SafeCopy, Debug, PartialEq, Clone)]
enum Tree<A> {
    Leaf(A),
    Node(Box<Tree<A>>, Box<Tree<A>>),
}

#[derive(SafeCopy, Debug, PartialEq)]
enum Expr<T> {
    Lit(T),
    Block(Box<Stmt<T>>),
}

#[derive(SafeCopy, Debug, PartialEq)]
enum Stmt<T> {
    Eval(Box<Expr<T>>),
    Nop,
}

#[derive(SafeCopy, Debug)]
enum Empty {}

fn parse_error(err: DecodeError) -> ParseError {
    match err {
        DecodeError::Parse(err) => err,
        other => panic!("unexpected {:?}", other),
    }
}

fn roundtrip<T: SafeCopy + PartialEq + std::fmt::Debug>(value: T) {
    let bytes = safe_encode(&value);
    assert_eq!(safe_decode::<T, _>(bytes).unwrap(), value);
}

#[test]
fn normal_scenario_bytes() {
    let c: Normal<Wrap, u16> = Normal::C(Wrap(1), Wrap(2));
    assert_eq!(
        safe_encode(&c),
        vec![
            0, 0, 0, 0, // Normal version
            0, // tag
            0, 0, 0, 3, // Wrap version, once
            1, 2,
        ]
    );
    let d: Normal<Wrap, u16> = Normal::D(7, -1);
    assert_eq!(
        safe_encode(&d),
        vec![0, 0, 0, 0, 1, 0x00, 0x07, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]
    );
    roundtrip(c);
    roundtrip(d);
}

#[test]
fn simple_scenario_bytes() {
    let c: Simple<Wrap, u16> = Simple::C(Wrap(1), Wrap(2));
    assert_eq!(
        safe_encode(&c),
        vec![0, 0, 0, 0, 0, 0, 0, 0, 3, 1, 0, 0, 0, 3, 2]
    );
    roundtrip(c);
    roundtrip(Simple::<Wrap, u16>::D(9, 10));
}

#[test]
fn legacy_matches_simple_for_tagged_types() {
    let simple: Simple<Wrap, String> = Simple::D("x".into(), 4);
    let legacy: Legacy<Wrap, String> = Legacy::D("x".into(), 4);
    assert_eq!(safe_encode(&simple), safe_encode(&legacy));
    roundtrip(legacy);
    roundtrip(Legacy::<Wrap, String>::C(Wrap(5), Wrap(6)));
}

#[test]
fn tag_is_declaration_index() {
    let c: Normal<u8, u8> = Normal::C(0, 0);
    let d: Normal<u8, u8> = Normal::D(0, 0);
    assert_eq!(safe_encode(&c)[4], 0);
    assert_eq!(safe_encode(&d)[4], 1);
    assert_eq!(safe_encode(&c), safe_encode(&c.clone()));
}

#[test]
fn single_constructor_is_untagged() {
    assert_eq!(safe_encode(&Point { x: 1, y: 2 }), vec![0, 0, 0, 1, 0, 1, 0, 2]);
    assert_eq!(safe_encode(&Unit::Only), vec![0, 0, 0, 0]);
    roundtrip(Point { x: 1, y: 2 });
    roundtrip(Unit::Only);
}

#[test]
fn legacy_forces_tag() {
    assert_eq!(
        safe_encode(&LegacyPoint { x: 1, y: 2 }),
        vec![0, 0, 0, 1, 0, 0, 1, 0, 2]
    );
    roundtrip(LegacyPoint { x: 1, y: 2 });
}

#[test]
fn normal_writes_each_version_once() {
    let v = Labels {
        a: vec![1],
        b: vec![],
        c: Wrap(9),
        d: vec![2],
    };
    assert_eq!(
        safe_encode(&v),
        vec![
            0, 0, 0, 0, // Labels
            0, 0, 0, 0, // Vec<u8>
            0, 0, 0, 3, // Wrap
            0, 0, 0, 0, 0, 0, 0, 1, 1, // a
            0, 0, 0, 0, 0, 0, 0, 0, // b
            9, // c
            0, 0, 0, 0, 0, 0, 0, 1, 2, // d
        ]
    );
    roundtrip(v);
}

#[test]
fn recursive_types() {
    let t = Tree::Node(
        Box::new(Tree::Leaf(1u32)),
        Box::new(Tree::Node(Box::new(Tree::Leaf(2)), Box::new(Tree::Leaf(3)))),
    );
    roundtrip(t);
}

#[test]
fn mutually_recursive_types() {
    let e: Expr<u8> = Expr::Block(Box::new(Stmt::Eval(Box::new(Expr::Lit(4)))));
    roundtrip(e);
    roundtrip(Stmt::<u8>::Nop);
}

#[test]
fn unknown_tag_message() {
    let err = safe_decode::<Normal<u8, u8>, _>(vec![0u8, 0, 0, 0, 7]).unwrap_err();
    let err = parse_error(err);
    assert_eq!(err.labels(), &["Normal"]);
    assert_eq!(
        err.root().to_string(),
        "Could not identify tag \"7\" for type Normal that has only 2 constructors.  Maybe your data is corrupted?"
    );
    assert!(matches!(err.root(), ParseError::Token(_)));
}

#[test]
fn empty_enum_never_decodes() {
    let err = safe_decode::<Empty, _>(vec![0u8, 0, 0, 0, 0]).unwrap_err();
    let err = parse_error(err);
    assert_eq!(
        err.root().to_string(),
        "Could not identify tag \"0\" for type Empty that has only 0 constructors.  Maybe your data is corrupted?"
    );
}

#[test]
fn truncated_input_is_labelled() {
    let bytes = safe_encode(&Point { x: 1, y: 2 });
    let err = safe_decode::<Point, _>(&bytes[..6]).unwrap_err();
    let err = parse_error(err);
    assert_eq!(err.labels(), &["Point"]);
}

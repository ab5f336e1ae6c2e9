//! End-to-end translation of small Go programs.

use go2j_engine::{EngineError, NoSystemSources, Program, TranslatedUnit};

fn translate(files: &[(&str, &str)]) -> Vec<TranslatedUnit> {
    Program::translate(files.iter().copied(), &NoSystemSources).expect("translation failed")
}

fn unit<'a>(units: &'a [TranslatedUnit], path: &str) -> &'a str {
    units
        .iter()
        .find(|unit| unit.path == path)
        .map(|unit| unit.text.as_str())
        .unwrap_or_else(|| panic!("no unit {}", path))
}

#[test]
fn test_hello_world() {
    let units = translate(&[(
        "app/main.go",
        "package main\n\nimport \"fmt\"\n\nfunc main() {\n\tfmt.Println(\"hello\")\n}\n",
    )]);
    assert_eq!(units.len(), 1);
    assert_eq!(units[0].path, "app/Main.java");
    assert_eq!(units[0].qualified_name, "app.Main");
    insta::assert_snapshot!("hello_world", units[0].text);
}

#[test]
fn test_println_joins_arguments() {
    let units = translate(&[(
        "app/main.go",
        "package main\n\nimport \"fmt\"\n\nfunc main() {\n\tfmt.Println(\"a\", 1)\n}\n",
    )]);
    assert!(units[0].text.contains("System.out.println(\"a\" + \" \" + 1);"));
}

#[test]
fn test_result_type_from_later_file() {
    let a = "package a\n\nimport \"proj/b\"\n\nfunc Run() {\n\tx := b.Foo()\n\t_ = x\n}\n";
    let b = "package b\n\ntype Bar struct {\n\tN int\n}\n\nfunc Foo() Bar {\n\treturn Bar{N: 1}\n}\n";
    let units = translate(&[("proj/a/a.go", a), ("proj/b/b.go", b)]);

    let run = unit(&units, "proj/a/A.java");
    assert!(run.contains("Bar x = B.Foo();"), "{}", run);
    assert!(run.contains("import proj.b.B;"));
    assert!(run.contains("import proj.b.Bar;"));

    let foo = unit(&units, "proj/b/B.java");
    assert!(foo.contains("public static Bar Foo() {"));
    assert!(foo.contains("return new Bar(1);"));

    let bar = unit(&units, "proj/b/Bar.java");
    assert!(bar.contains("public class Bar {"));
    assert!(bar.contains("\tpublic int N;"));
    assert!(bar.contains("\tpublic Bar(int N) {"));
    assert!(bar.contains("\t\tthis.N = N;"));
}

#[test]
fn test_interface_inferred_once() {
    let source = "package shapes

type Shape interface {
	Area() float64
}

type Circle struct {
	R float64
}

func (c *Circle) Area() float64 {
	return c.R * c.R
}

func NewCircle(r float64) Shape {
	return &Circle{R: r}
}

func Unit() Shape {
	return &Circle{R: 1}
}

func Big() Shape {
	return &Circle{R: 10}
}
";
    let units = translate(&[("geo/shapes/shapes.go", source)]);

    let circle = unit(&units, "geo/shapes/Circle.java");
    assert!(circle.contains("public class Circle implements Shape {"), "{}", circle);
    assert_eq!(circle.matches("Shape").count(), 1);
    assert!(circle.contains("\tpublic double Area() {"));
    assert!(circle.contains("return this.R * this.R;"));
    assert!(!circle.contains("import"));

    let shape = unit(&units, "geo/shapes/Shape.java");
    assert!(shape.contains("public interface Shape {"));
    assert!(shape.contains("\tdouble Area();"));

    let shapes = unit(&units, "geo/shapes/Shapes.java");
    assert!(shapes.contains("public static Shape NewCircle(double r) {"));
    assert!(shapes.contains("return new Circle(r);"));
}

#[test]
fn test_package_var_type_from_later_file() {
    let a = "package a\n\nimport \"proj/b\"\n\nfunc Run() {\n\tx := b.Default\n\t_ = x\n}\n";
    let b = "package b

var Default = Foo()

type Bar struct {
\tN int
}

func Foo() Bar {
\treturn Bar{N: 1}
}
";
    let units = translate(&[("proj/a/a.go", a), ("proj/b/b.go", b)]);

    let run = unit(&units, "proj/a/A.java");
    assert!(run.contains("Bar x = B.Default;"), "{}", run);
    assert!(run.contains("import proj.b.Bar;"));
    let package = unit(&units, "proj/b/B.java");
    assert!(package.contains("public static Bar Default = Foo();"), "{}", package);
}

#[test]
fn test_field_types_follow_declaring_struct() {
    let source = "package main

type a struct {
\tX int
}

type b struct {
\tX string
}

func (r *b) get() {
\tv := r.X
\t_ = v
}

func use(p *a, q *b) {
\tu := p.X
\tw := q.X
\t_, _ = u, w
}
";
    let units = translate(&[("app/main.go", source)]);
    let text = &units[0].text;
    assert!(text.contains("String v = this.X;"), "{}", text);
    // Fields resolve through the receiver only.
    assert!(text.contains("Object u = p.X;"));
    assert!(text.contains("Object w = q.X;"));
}

#[test]
fn test_interface_inferred_once_across_returns() {
    let source = "package shapes

type Shape interface {
\tArea() float64
}

type Circle struct {
\tR float64
}

func Pick(n int) Shape {
\tif n == 0 {
\t\treturn &Circle{R: 0}
\t}
\tif n == 1 {
\t\treturn &Circle{R: 1}
\t}
\treturn &Circle{R: 2}
}
";
    let units = translate(&[("geo/shapes/shapes.go", source)]);
    let circle = unit(&units, "geo/shapes/Circle.java");
    assert!(circle.contains("public class Circle implements Shape {"), "{}", circle);
    assert_eq!(circle.matches("Shape").count(), 1);
}

#[test]
fn test_index_inside_range_inside_method() {
    let source = "package main

type Index struct {
\tWords map[string]string
}

func (ix *Index) Total() int {
\tn := 0
\tfor k := range ix.Words {
\t\tn += len(ix.Words[k])
\t}
\treturn n
}
";
    let units = translate(&[("app/main.go", source)]);
    let index = unit(&units, "app/Index.java");
    assert!(
        index.contains("for (Map.Entry<String, String> entry : this.Words.entrySet()) {"),
        "{}",
        index
    );
    assert_eq!(index.matches("String k = entry.getKey();").count(), 1);
    assert!(index.contains("n += this.Words.get(k).length();"));
}

#[test]
fn test_large_map_literal() {
    let entries: Vec<String> = (0..12).map(|n| format!("\"k{n}\": {n}")).collect();
    let source = format!(
        "package main\n\nvar table = map[string]int{{{}}}\n",
        entries.join(", ")
    );
    let units = translate(&[("app/main.go", source.as_str())]);
    let text = &units[0].text;
    assert!(text.contains("new HashMap<String, Integer>(Map.ofEntries(Map.entry(\"k0\", 0), "));
    assert_eq!(text.matches("Map.entry(").count(), 12, "{}", text);
}

#[test]
fn test_method_before_struct() {
    let units = translate(&[
        ("app/area.go", "package main\n\nfunc (s *Square) Area() int {\n\treturn s.W * s.W\n}\n"),
        ("app/square.go", "package main\n\ntype Square struct {\n\tW int\n}\n"),
    ]);
    let square = unit(&units, "app/Square.java");
    assert!(square.contains("\tpublic int Area() {"), "{}", square);
    assert!(square.contains("return this.W * this.W;"));
    assert!(!unit(&units, "app/Main.java").contains("Area"));
}

#[test]
fn test_map_range() {
    let source = "package main

import \"fmt\"

func main() {
	counts := map[string]int{\"a\": 1}
	for k, v := range counts {
		fmt.Println(k, v)
	}
}
";
    let units = translate(&[("app/main.go", source)]);
    let text = &units[0].text;
    assert!(
        text.contains(
            "Map<String, Integer> counts = \
             new HashMap<String, Integer>(Map.ofEntries(Map.entry(\"a\", 1)));"
        ),
        "{}",
        text
    );
    assert!(text.contains("for (Map.Entry<String, Integer> entry : counts.entrySet()) {"));
    assert!(text.contains("String k = entry.getKey();"));
    assert!(text.contains("int v = entry.getValue();"));
    assert!(text.contains("System.out.println(k + \" \" + v);"));
    assert!(text.contains("import java.util.HashMap;"));
    assert!(text.contains("import java.util.Map;"));
}

#[test]
fn test_member_syntax_follows_types() {
    let source = "package main

func count(m map[string]int, s string, xs []int) int {
	return len(m) + len(s) + len(xs) + m[\"a\"] + xs[0]
}

func tail(s string, xs []int) []int {
	t := s[1:]
	_ = t
	return xs[1:3]
}
";
    let units = translate(&[("app/main.go", source)]);
    let text = &units[0].text;
    assert!(
        text.contains("return m.size() + s.length() + xs.length + m.get(\"a\") + xs[0];"),
        "{}",
        text
    );
    assert!(text.contains("String t = s.substring(1);"));
    assert!(text.contains("return Arrays.copyOfRange(xs, 1, 3);"));
    assert!(text.contains("import java.util.Arrays;"));
}

#[test]
fn test_flatten_twice() {
    let mut program = Program::new();
    program
        .discover("app/main.go", "package main\n", &NoSystemSources)
        .unwrap();
    assert_eq!(program.flatten().unwrap().len(), 1);
    assert!(matches!(program.flatten(), Err(EngineError::AlreadyFlattened)));
}

#[test]
fn test_units_serialize() {
    let units = translate(&[("app/main.go", "package main\n")]);
    let json = serde_json::to_value(&units).unwrap();
    assert_eq!(json[0]["class"], "Main");
    assert_eq!(json[0]["package"], "app");
}

#[test]
fn test_control_flow() {
    let source = "package main

func classify(n int) string {
	switch n {
	case 0, 1:
		return \"small\"
	default:
		return \"big\"
	}
}

func loop() {
	total := 0
	for i := 0; i < 3; i++ {
		if i == 1 {
			continue
		} else if i == 2 {
			total += i
		} else {
			total--
		}
	}
}
";
    let units = translate(&[("app/main.go", source)]);
    let text = &units[0].text;
    assert!(text.contains("protected static String classify(int n) {"), "{}", text);
    assert!(text.contains(
        "\t\tswitch (n) {\n\t\tcase 0:\n\t\tcase 1:\n\t\t\treturn \"small\";\n\t\tdefault:\n\t\t\treturn \"big\";\n\t\t}\n"
    ));
    assert!(!text.contains("break;"));
    assert!(text.contains("int total = 0;"));
    assert!(text.contains("for (int i = 0; i < 3; i++) {"));
    assert!(text.contains("continue;"));
    assert!(text.contains("} else if (i == 2) {"));
    assert!(text.contains("total += i;"));
    assert!(text.contains("} else {"));
    assert!(text.contains("total--;"));
}

#[test]
fn test_degraded_constructs() {
    let source = "package main

func misc() {
	defer cleanup()
	go work()
	s := `a
b`
	_ = s
}
";
    let units = translate(&[("app/main.go", source)]);
    let text = &units[0].text;
    assert!(text.contains("// defer cleanup"), "{}", text);
    assert!(text.contains("new Thread(() -> work()).start();"));
    assert!(text.contains("String s = \"a\\n\"+\n\"b\";"));
}

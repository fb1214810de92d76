#[cfg(test)]
mod verify {
    use ipg::{checking, emitting, parsing};

    /// A grammar for the notation itself. Parsing it, validating it, and
    /// emitting a parser from it exercises every element kind at once.
    const SELF_GRAMMAR: &str = r#"
# the notation, described in itself
grammar : ws rule+ ;
rule : id ws mod? ":" ws alts ";" ws ;
mod : ( "discard" | "inline" | "mergeup" ) ws ;
alts : alt ( "|" ws alt )* ;
alt : elem+ ;
elem : ( group | id | ch_class | string ) [?*+]? ws ;
group : "(" ws alts ")" ws ;
id : [A-Za-z] [0-9A-Za-z_]* ;
ch_class : "[" "^"? ch_range+ "]" ;
ch_range : "\!"? ch_char ( "-" ch_char )? ;
ch_char : [^\]] ;
string : "\"" [^"]* "\"" ;
ws discard : [ \t\r\n]* ;
    "#;

    #[test]
    fn the_notation_describes_itself() {
        let grammar = parsing::parse(SELF_GRAMMAR).unwrap();

        assert_eq!(grammar.len(), 13);
        assert_eq!(
            grammar
                .root()
                .map(|rule| rule.name),
            Some("grammar")
        );
        assert_eq!(checking::check(&grammar), Ok(()));

        let source = emitting::emit(&grammar);
        for rule in grammar.iter() {
            assert!(
                source.contains(&format!("fn parse_{}(", rule.name)),
                "no method generated for '{}'",
                rule.name
            );
        }
    }

    #[test]
    fn a_small_data_format() {
        let grammar = parsing::parse(
            r#"
document : ws value ws ;
value : object | array | string | number | keyword ;
object : "{" ws ( member ( ws "," ws member )* )? ws "}" ;
member : string ws ":" ws value ;
array : "[" ws ( value ( ws "," ws value )* )? ws "]" ;
string : "\"" [^"]* "\"" ;
number : "-"? [0-9]+ ( "." [0-9]+ )? ;
keyword : "true" | "false" | "null" ;
ws discard : [ \t\r\n]* ;
            "#,
        )
        .unwrap();

        assert_eq!(checking::check(&grammar), Ok(()));

        let source = emitting::emit(&grammar);
        assert!(source.contains("self.parse_document(root)"));
        // literals at rule depth, one group deep, and two groups deep
        assert!(source.contains(r#"let lit2: &[u8] = b"true";"#));
        assert!(source.contains(r#"let lit4: &[u8] = b".";"#));
        assert!(source.contains(r#"let lit6: &[u8] = b",";"#));
    }

    #[test]
    fn unreferenced_helper_rules_are_rejected() {
        let grammar = parsing::parse(
            r#"
document : "x" ;
helper : [0-9] ;
other : helper ;
            "#,
        )
        .unwrap();

        let errors = checking::check(&grammar).unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}

/// dnfidx API walkthrough:
/// - adding documents described by DNF targeting expressions
/// - searching by key=value facts with an attribute filter
/// - soft deletion
/// - export listings
use serde_json::{Map, Value};

use dnfidx::core::handler::Handler;
use dnfidx::core::types::{Cond, DocAttr};

#[derive(Debug, Clone)]
struct AdAttr {
    height: u32,
    width: u32,
    duration: u32,
}

impl DocAttr for AdAttr {
    fn to_text(&self) -> String {
        format!(
            "{{height: {}, width: {}, duration: {}}}",
            self.height, self.width, self.duration
        )
    }

    fn to_map(&self) -> Map<String, Value> {
        let mut m = Map::new();
        m.insert("height".to_string(), self.height.into());
        m.insert("width".to_string(), self.width.into());
        m.insert("duration".to_string(), self.duration.into());
        m
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let handler = Handler::new();

    // Step 1: add ads with their targeting expressions.
    println!("Step 1: adding documents...");
    let ads = [
        ("ad0", "(region in {ShangHai, Beijing} and age not in {3, 4})", 20),
        ("ad1", "(region in {ShenZhen, ShangHai}) or (age not in {4, 6})", 15),
        ("ad2", "(region in {ShangHai, NanJing} and age not in {3, 5, 6})", 10),
        ("ad3", "(region in {ChengDu, Beijing, WuHan}) or (age not in {4, 3})", 30),
        ("ad4", "(age not in {3, 4})", 35),
    ];
    for (i, (name, dnf, duration)) in ads.into_iter().enumerate() {
        handler.add_document(
            name,
            &i.to_string(),
            dnf,
            AdAttr {
                height: 300,
                width: 250,
                duration,
            },
        )?;
        println!("  added {}: {}", name, dnf);
    }

    // Step 2: search with facts and an attribute filter.
    println!("\nStep 2: searching region=NanJing, age=5, duration<=30...");
    let conds = vec![Cond::new("region", "NanJing"), Cond::new("age", "5")];
    let docs = handler.search(&conds, |attr| attr.duration <= 30)?;
    for doc in &docs {
        println!(
            "  doc {} -> {} | {}",
            doc.value(),
            serde_json::to_string(&handler.doc_map(*doc)?)?,
            handler.doc_expression(*doc)?
        );
    }

    // Step 3: soft delete and search again.
    println!("\nStep 3: soft-deleting ad1...");
    handler.delete_document("1", "campaign finished");
    let docs = handler.search(&conds, |attr| attr.duration <= 30)?;
    println!("  matches now: {:?}", docs.iter().map(|d| d.value()).collect::<Vec<_>>());

    // Step 4: export a listing page.
    println!("\nStep 4: dumping page 1 (3 per page)...");
    let page = handler.dump_by_page(1, 3);
    println!("{}", serde_json::to_string_pretty(&page)?);

    Ok(())
}

//! The bundled sample tree: one suite of two units and one case with two
//! sub-tests, each pair with one passing and one failing member.

use crate::api::Declare;
use crate::core::error::Error;

pub fn declare(scope: &impl Declare) -> Result<(), Error> {
    scope.describe("test1", |s| async move {
        s.it("test2", || async {
            assert_eq!("tap".len(), 3);
            Ok(())
        })?;
        s.it("test3", || async {
            let sum: i32 = [1, 1].iter().sum();
            anyhow::ensure!(sum == 3, "expected 3, got {sum}");
            Ok(())
        })?;
        Ok(())
    })?;

    scope.test("test4", |ctx| async move {
        ctx.test("test5", |_| async { Ok(()) })?;
        ctx.test("test6", |_| async { Err(anyhow::anyhow!("deliberate failure")) })?;
        Ok(())
    })?;

    Ok(())
}
